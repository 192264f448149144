use minijinja::{context, Environment};

use crate::history::Turn;

const INDEX_TEMPLATE: &str = "index.html";

/// Template environment for the chat page. `.html` templates are
/// auto-escaped, so stored turns render as text.
pub fn environment() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(INDEX_TEMPLATE, include_str!("../../templates/index.html"))?;
    Ok(env)
}

pub fn render_index(env: &Environment<'_>, history: &[Turn]) -> Result<String, minijinja::Error> {
    env.get_template(INDEX_TEMPLATE)?
        .render(context! { chat_history => history })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_renders_turns_in_order() {
        let env = environment().unwrap();
        let html = render_index(
            &env,
            &[Turn::user("what is gout?"), Turn::assistant("a kind of arthritis")],
        )
        .unwrap();

        let q = html.find("what is gout?").unwrap();
        let a = html.find("a kind of arthritis").unwrap();
        assert!(q < a);
        assert!(html.contains("turn user"));
        assert!(html.contains("turn assistant"));
    }

    #[test]
    fn turn_content_is_escaped() {
        let env = environment().unwrap();
        let html = render_index(&env, &[Turn::user("<script>alert(1)</script>")]).unwrap();

        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
