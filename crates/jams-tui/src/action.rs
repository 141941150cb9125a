//! Action enum — everything a view can ask the App to do.

/// Views produce Actions from key events; the App dispatches them to the
/// controller or handles them itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// The URL input changed.
    UrlChanged(String),
    Submit,
    Regenerate,
    Reset,
    CopyToClipboard(String),
    Quit,
}
