//! Form post response page.
//!
//! The `form_post` response modes deliver the parameters as hidden inputs
//! of a form that submits itself to the redirect URI on load.

/// Renders the auto-submitting form page.
///
/// Every attribute value is HTML-escaped.
pub fn render_form_post<'a, I>(action: &str, fields: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut inputs = String::new();
    for (name, value) in fields {
        inputs.push_str("        <input type=\"hidden\" name=\"");
        inputs.push_str(&html_escape(name));
        inputs.push_str("\" value=\"");
        inputs.push_str(&html_escape(value));
        inputs.push_str("\"/>\n");
    }

    let mut html = String::with_capacity(inputs.len() + 600);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("    <meta charset=\"UTF-8\">\n");
    html.push_str("    <title>Submit This Form</title>\n");
    html.push_str("</head>\n");
    html.push_str("<body onload=\"javascript:document.forms[0].submit()\">\n");
    html.push_str("    <form method=\"post\" action=\"");
    html.push_str(&html_escape(action));
    html.push_str("\">\n");
    html.push_str(&inputs);
    html.push_str("        <noscript>\n");
    html.push_str("            <p>JavaScript is disabled. Press the button to continue.</p>\n");
    html.push_str("            <button type=\"submit\">Continue</button>\n");
    html.push_str("        </noscript>\n");
    html.push_str("    </form>\n</body>\n</html>");
    html
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_form_post() {
        let html = render_form_post(
            "https://app.example.com/cb",
            [("code", "xyz"), ("state", "abc123")],
        );
        assert!(html.contains("action=\"https://app.example.com/cb\""));
        assert!(html.contains("name=\"code\" value=\"xyz\""));
        assert!(html.contains("name=\"state\" value=\"abc123\""));
        assert!(html.contains("document.forms[0].submit()"));
    }

    #[test]
    fn test_values_are_escaped() {
        let html = render_form_post(
            "https://app.example.com/cb?a=1&b=2",
            [("state", "\"><script>alert('x')</script>")],
        );
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&quot;&gt;&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(html.contains("a=1&amp;b=2"));
    }
}
