//! `{{NAME}}` placeholder substitution for the embedded SVG templates.

use uuid::Uuid;

/// Replace every `{{KEY}}` whose name matches one of `vars` (ignoring case).
///
/// Single pass: substituted values are never rescanned, and placeholders with
/// no matching variable are copied through unchanged.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 128);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match vars.iter().find(|(name, _)| name.eq_ignore_ascii_case(key)) {
            Some((_, value)) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(key);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

/// Rename the template gradient `g` to `id`, in both quote styles and in `url(#g)`.
pub fn rename_gradient(svg: &str, id: &str) -> String {
    if !svg.contains("id=\"g\"") && !svg.contains("id='g'") {
        return svg.to_string();
    }
    svg.replace("id=\"g\"", &format!("id=\"{id}\""))
        .replace("id='g'", &format!("id='{id}'"))
        .replace("url(#g)", &format!("url(#{id})"))
}

/// Fresh gradient id so several inline SVGs can share one document.
pub fn unique_gradient_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("g{}", &simple[..10])
}

/// Fill a template and give its gradient a unique id.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    rename_gradient(&fill(template, vars), &unique_gradient_id())
}
