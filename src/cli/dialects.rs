//! Side-by-side dialect renderings for the `dialects` command

use crate::Dialect;

/// Rules rendered for every dialect in the comparison.
const SAMPLES: [(&str, &str); 6] = [
    ("substr", r#"{"substr": [{"var": "name"}, 1, 3]}"#),
    ("in (string)", r#"{"in": ["@", "a@b.c"]}"#),
    ("in (array)", r#"{"in": ["vip", {"var": "tags"}]}"#),
    ("merge", r#"{"merge": [{"var": "a"}, {"var": "b"}]}"#),
    ("map", r#"{"map": [{"var": "items"}, {"*": [{"var": ""}, 2]}]}"#),
    ("some", r#"{"some": [{"var": "items"}, {">": [{"var": ""}, 10]}]}"#),
];

/// Lists the supported dialects and how each renders the operators whose
/// SQL differs between them.
pub fn get_dialects_overview() -> String {
    let mut out = String::from("SUPPORTED DIALECTS\n\n");
    for dialect in Dialect::ALL {
        out.push_str(&format!("  {}\n", dialect));
    }

    for dialect in Dialect::ALL {
        out.push_str(&format!("\n{}\n", dialect.name().to_uppercase()));
        for (label, rule) in SAMPLES {
            let rendered = crate::transpile_condition(dialect, rule)
                .unwrap_or_else(|e| format!("<{}>", e));
            out.push_str(&format!("  {:<13}{}\n", label, rendered));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_sample_compiles() {
        let overview = get_dialects_overview();
        assert!(!overview.contains("<["), "{}", overview);
        assert!(overview.contains("arrayMap(elem -> (elem * 2), items)"));
        assert!(overview.contains("'vip' = ANY(tags)"));
    }
}
