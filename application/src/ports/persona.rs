//! Persona decoration port
//!
//! A persona colours a participant's output before other participants get
//! to read it. The engine only knows persona ids; what a persona means is
//! up to the decorator.

/// Rewrites an author's output for the prompts it is folded into
pub trait PersonaDecorator: Send + Sync {
    /// Return `output`, written by a participant playing `persona`, as
    /// later readers should see it
    fn decorate(&self, output: &str, persona: &str) -> String;
}

/// Decorator that leaves every output unchanged
pub struct NoPersona;

impl PersonaDecorator for NoPersona {
    fn decorate(&self, output: &str, _persona: &str) -> String {
        output.to_string()
    }
}

/// Tags the output with the persona its author spoke as
pub struct RolePrefix;

impl PersonaDecorator for RolePrefix {
    fn decorate(&self, output: &str, persona: &str) -> String {
        format!("[as {}] {}", persona.trim(), output)
    }
}
