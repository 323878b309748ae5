use super::errors::{CompileError, Diagnostic};

/// Format in a human-readable way a compilation error
///
/// Each located problem is displayed with the grammar's line it occurs on.
pub fn pretty_format_compile_error(input: &str, err: &CompileError) -> String {
    let diags = err.diagnostics();

    if diags.is_empty() {
        return format!("ERROR: {}", err);
    }

    diags
        .iter()
        .map(|diag| pretty_format_diagnostic(input, diag))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Format a single diagnostic with the source line it points to
pub fn pretty_format_diagnostic(input: &str, diag: &Diagnostic) -> String {
    let line_num = diag.line().to_string();
    let padding = " ".repeat(line_num.len() + 3 + diag.column() - 1);

    format!(
        "ERROR: At line {}, column {}:\n\n{} | {}\n{}^\n{}{}",
        diag.line(),
        diag.column(),
        line_num,
        input.lines().nth(diag.line() - 1).unwrap_or(""),
        padding,
        padding,
        diag.message()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::Location;

    #[test]
    fn points_at_the_column() {
        let diag = Diagnostic::new("Oops", Location::new(2, 3));
        let out = pretty_format_diagnostic("A = b;\nB = c", &diag);

        assert_eq!(
            out,
            "ERROR: At line 2, column 3:\n\n2 | B = c\n      ^\n      Oops"
        );
    }
}
