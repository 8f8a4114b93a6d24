//! Chronovyan Diagnostics - Source locations and the shared message sink
//!
//! Every compiler stage reports problems by appending to a [`Diagnostics`]
//! value passed in by mutable reference. A stage never aborts on bad input;
//! the caller checks [`Diagnostics::has_errors`] between stages.

mod diagnostic;
mod location;

pub use diagnostic::*;
pub use location::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_format() {
        let mut diags = Diagnostics::new();
        let file = diags.register_file("main.cvy");
        diags.error(SourceLocation::new(file, 3, 7), "Undefined variable 'x'");

        let rendered = diags.render(diags.iter().next().unwrap());
        assert_eq!(rendered, "[ERROR] main.cvy:3:7: Undefined variable 'x'");
    }

    #[test]
    fn test_register_file_interns() {
        let mut diags = Diagnostics::new();
        let a = diags.register_file("a.cvy");
        let b = diags.register_file("b.cvy");
        assert_ne!(a, b);
        assert_eq!(diags.register_file("a.cvy"), a);
        assert_eq!(diags.file_name(b), "b.cvy");
    }

    #[test]
    fn test_info_and_hint_need_debug_output() {
        let mut quiet = Diagnostics::new();
        quiet.info(SourceLocation::invalid(), "note");
        quiet.hint(SourceLocation::invalid(), "try this");
        quiet.warning(SourceLocation::invalid(), "careful");
        assert_eq!(quiet.len(), 1);

        let mut verbose = Diagnostics::with_debug_output(true);
        verbose.info(SourceLocation::invalid(), "note");
        verbose.hint(SourceLocation::invalid(), "try this");
        assert_eq!(verbose.len(), 2);
        assert!(!verbose.has_errors());
    }

    #[test]
    fn test_order_and_counts() {
        let mut diags = Diagnostics::new();
        let loc = SourceLocation::new(FileId(0), 1, 1);
        diags.warning(loc, "first");
        diags.error(loc, "second");
        diags.error(loc, "third");

        let messages: Vec<_> = diags.iter().map(|d| d.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        assert_eq!(diags.error_count(), 2);
        assert_eq!(diags.warning_count(), 1);
        assert!(diags.has_errors());
    }

    #[test]
    fn test_invalid_location_render() {
        let mut diags = Diagnostics::new();
        diags.register_file("x.cvy");
        diags.error(SourceLocation::invalid(), "internal");
        assert_eq!(diags.render_all(), "[ERROR] x.cvy: internal");
        assert!(!SourceLocation::invalid().is_valid());
    }
}
