//! Host page rendering.

use crate::embed::serve::{HOST_HTML, HostVars};
use crate::utils::html::{escape, escape_json_script};

/// Render the host page.
///
/// `initial` is the JSON message the page applies before any live update
/// arrives (`null` for none). `ws_port` is `None` when live reload is off.
pub fn host_page(title: &str, initial: &str, ws_port: Option<u16>) -> String {
    let title = escape(title);
    let initial = escape_json_script(initial);
    HOST_HTML.render(&HostVars {
        title: &title,
        initial: &initial,
        ws_port,
    })
}
