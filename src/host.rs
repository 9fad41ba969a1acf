//! The seam between the flow controller and the embedding application. The
//! host owns the actual widget toolkit, image loading, and UI-thread
//! affinity; the controller only ever hands it visual trees and URLs.

use crate::render::visual::Visual;
use crate::theme::ViewportClass;

/// One rendering surface inside the host application.
///
/// Implementations must marshal onto their own UI context where the toolkit
/// requires it; the controller calls these from background tasks.
pub trait HostSurface: Send + Sync + 'static {
    /// Current size class of the surface; decides layout and padding.
    fn viewport(&self) -> ViewportClass;

    /// Replace the surface contents with a composed tree.
    fn show(&self, tree: Visual);

    /// Remove everything from the surface.
    fn clear(&self);

    /// Open an external destination (browser, in-app tab) best-effort.
    fn open_link(&self, url: &str);
}
