use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use super::IoError;
use crate::rule::RewriteRule;

/// Writes one newline-terminated canonical rule per line.
///
/// # Errors
///
/// This function will return an error if writing fails.
pub fn write_rules<W: Write>(writer: W, rules: &[RewriteRule]) -> Result<(), IoError> {
    let mut writer = BufWriter::new(writer);
    for rule in rules {
        writeln!(writer, "{rule}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Like [`write_rules`], into a freshly created file.
///
/// # Errors
///
/// This function will return an error if the file cannot be created or written.
pub fn write_rules_file(path: &Path, rules: &[RewriteRule]) -> Result<(), IoError> {
    write_rules(File::create(path)?, rules)?;
    info!("Wrote {} rules to {}", rules.len(), path.display());
    Ok(())
}

/// Writes the parsed rule trees as JSON for tools that want structured access.
///
/// # Errors
///
/// This function will return an error if the file cannot be created or written.
pub fn write_rules_json(path: &Path, rules: &[RewriteRule]) -> Result<(), IoError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, rules)?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::Notation;

    #[test]
    fn one_rule_per_line() {
        let rules = [
            RewriteRule::from_texts("a", "a+b", "b+a", None, Notation::Halide).unwrap(),
            RewriteRule::from_texts("b", "(/ ?x ?x)", "1", Some("is_not_zero(\"?x\")"), Notation::Caviar)
                .unwrap(),
        ];
        let mut out = Vec::new();
        write_rules(&mut out, &rules).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "(+ a b) ==> (+ b a)\n(/ ?x ?x) ==> 1 if (! (= ?x 0))\n"
        );
    }

    #[test]
    fn json_keeps_structure() {
        let rules = [RewriteRule::from_texts("neg", "-x", "0 - x", None, Notation::Halide).unwrap()];
        let path = std::env::temp_dir().join(format!("rulebridge-{}-rules.json", std::process::id()));
        write_rules_json(&path, &rules).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value[0]["name"], "neg");
        assert_eq!(value[0]["lhs"]["Unary"]["op"], "Neg");
        assert_eq!(value[0]["condition"], serde_json::Value::Null);
        std::fs::remove_file(&path).unwrap();
    }
}
