//! Static page chrome.
//!
//! The provider supplies every non-form fragment of the portal page. The
//! default implementation renders a small, dependency-free page that works
//! on phone browsers connecting straight to a device; embedders can swap in
//! their own provider for custom branding.

/// Supplies the static HTML fragments of the portal page.
///
/// `head()` may contain a `{v}` placeholder which the page source replaces
/// with the page title.
pub trait HtmlFormatProvider {
    fn head(&self) -> &str;
    fn script(&self) -> &str;
    fn style(&self) -> &str;
    /// Extra content injected before `</head>`; empty by default.
    fn head_extension(&self) -> &str {
        ""
    }
    fn head_end(&self) -> &str;
    fn form_start(&self) -> &str;
    fn form_end(&self) -> &str;
    fn end(&self) -> &str;

    /// Link to the firmware update page, when one is configured.
    fn update_link(&self, path: &str) -> String;

    /// Footer line showing the active configuration version.
    fn config_version(&self, version: &str) -> String;
}

/// The stock portal chrome.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHtmlProvider;

const HEAD: &str = "<!DOCTYPE html><html lang=\"en\"><head>\
<meta charset=\"utf-8\"/>\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1, user-scalable=no\"/>\
<title>{v}</title>";

// Reveal toggle for password fields; kept tiny so it streams in one fragment.
const SCRIPT: &str = "<script>\
function pwToggle(id){var e=document.getElementById(id);\
e.type=e.type==='password'?'text':'password';}\
</script>";

const STYLE: &str = "<style>\
body{font-family:system-ui,sans-serif;margin:0;padding:1em;background:#f4f4f4}\
fieldset{border:1px solid #ccc;border-radius:4px;margin:0 0 1em;padding:.8em;background:#fff}\
legend{font-weight:600;padding:0 .3em}\
.field{margin:.5em 0}\
.field label{display:block;font-size:.85em;color:#444;margin-bottom:.2em}\
.field input,.field select{width:100%;box-sizing:border-box;padding:.4em;border:1px solid #bbb;border-radius:3px}\
.field input[type=checkbox]{width:auto}\
button{padding:.5em 1.4em;border:0;border-radius:3px;background:#1fa3ec;color:#fff;font-size:1em}\
.up,.ver{margin-top:1em;font-size:.85em;color:#666}\
.em{padding:1em;background:#fdd;border:1px solid #c66;border-radius:4px}\
</style>";

const HEAD_END: &str = "</head><body>";

const FORM_START: &str =
    "<form action=\"\" method=\"post\"><input type=\"hidden\" name=\"portalSave\" value=\"1\"/>";

const FORM_END: &str = "<button type=\"submit\">Apply configuration</button></form>";

const END: &str = "</body></html>";

impl HtmlFormatProvider for DefaultHtmlProvider {
    fn head(&self) -> &str {
        HEAD
    }

    fn script(&self) -> &str {
        SCRIPT
    }

    fn style(&self) -> &str {
        STYLE
    }

    fn head_end(&self) -> &str {
        HEAD_END
    }

    fn form_start(&self) -> &str {
        FORM_START
    }

    fn form_end(&self) -> &str {
        FORM_END
    }

    fn end(&self) -> &str {
        END
    }

    fn update_link(&self, path: &str) -> String {
        format!("<div class=\"up\"><a href=\"{path}\">Firmware update</a></div>")
    }

    fn config_version(&self, version: &str) -> String {
        format!("<div class=\"ver\">config version: {version}</div>")
    }
}
