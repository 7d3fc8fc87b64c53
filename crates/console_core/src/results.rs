//! Turns a SPARQL results XML payload into an ordered tabular row set.
//!
//! Traversal rule: every `result` element in document order yields one
//! row; each of its `binding` children contributes one cell whose key is
//! the `name` attribute (or a synthesized unique placeholder) and whose
//! value is the element's text content (empty if none). Rows carry
//! exactly their own bindings; no column reconciliation happens across
//! rows.

use shared::error::ErrorInfo;

/// One query result row: an ordered column-name -> cell-value mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QueryRow {
    cells: Vec<(String, String)>,
}

impl QueryRow {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn cells(&self) -> &[(String, String)] {
        &self.cells
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

pub fn parse_query_results(xml: &str) -> Result<Vec<QueryRow>, ErrorInfo> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|err| ErrorInfo::api("query returned malformed results XML").with_cause(err.to_string()))?;

    let mut rows = Vec::new();
    let mut placeholders = 0usize;
    for result in doc
        .descendants()
        .filter(|node| node.is_element() && node.tag_name().name() == "result")
    {
        let mut cells = Vec::new();
        for binding in result
            .children()
            .filter(|node| node.is_element() && node.tag_name().name() == "binding")
        {
            let name = match binding.attribute("name") {
                Some(name) => name.to_string(),
                None => {
                    placeholders += 1;
                    format!("unknown_{placeholders}")
                }
            };
            cells.push((name, text_content(binding)));
        }
        rows.push(QueryRow { cells });
    }
    Ok(rows)
}

/// Concatenated descendant text, matching DOM `textContent` so values
/// nested in `uri`/`literal` wrappers survive.
fn text_content(node: roxmltree::Node<'_, '_>) -> String {
    node.descendants()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_results_parse_to_two_rows_in_document_order() {
        let xml = r#"<sparql><results>
            <result><binding name="s">A</binding></result>
            <result><binding name="s">B</binding></result>
        </results></sparql>"#;

        let rows = parse_query_results(xml).expect("parse");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("s"), Some("A"));
        assert_eq!(rows[1].get("s"), Some("B"));
    }

    #[test]
    fn namespaced_sparql_results_document_parses() {
        let xml = r#"<?xml version="1.0"?>
        <sparql xmlns="http://www.w3.org/2005/sparql-results#">
          <head><variable name="s"/><variable name="o"/></head>
          <results>
            <result>
              <binding name="s"><uri>http://example.org/a</uri></binding>
              <binding name="o"><literal>hello</literal></binding>
            </result>
          </results>
        </sparql>"#;

        let rows = parse_query_results(xml).expect("parse");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("s"), Some("http://example.org/a"));
        assert_eq!(rows[0].get("o"), Some("hello"));
        assert_eq!(rows[0].columns().collect::<Vec<_>>(), vec!["s", "o"]);
    }

    #[test]
    fn missing_name_attribute_gets_unique_placeholder_keys() {
        let xml = r#"<results>
            <result><binding>x</binding><binding>y</binding></result>
        </results>"#;

        let rows = parse_query_results(xml).expect("parse");
        assert_eq!(rows[0].get("unknown_1"), Some("x"));
        assert_eq!(rows[0].get("unknown_2"), Some("y"));
    }

    #[test]
    fn binding_without_text_yields_empty_string() {
        let xml = r#"<results><result><binding name="s"/></result></results>"#;

        let rows = parse_query_results(xml).expect("parse");
        assert_eq!(rows[0].get("s"), Some(""));
    }

    #[test]
    fn rows_keep_only_their_own_bindings() {
        let xml = r#"<results>
            <result><binding name="a">1</binding><binding name="b">2</binding></result>
            <result><binding name="a">3</binding></result>
        </results>"#;

        let rows = parse_query_results(xml).expect("parse");
        assert_eq!(rows[0].cells().len(), 2);
        assert_eq!(rows[1].cells().len(), 1);
        assert_eq!(rows[1].get("b"), None);
    }

    #[test]
    fn zero_result_elements_yield_empty_row_set() {
        let xml = r#"<sparql><results/></sparql>"#;
        assert!(parse_query_results(xml).expect("parse").is_empty());
    }

    #[test]
    fn parsing_is_idempotent() {
        let xml = r#"<results>
            <result><binding name="s">A</binding></result>
            <result><binding>B</binding></result>
        </results>"#;

        let first = parse_query_results(xml).expect("parse");
        let second = parse_query_results(xml).expect("parse");
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_xml_is_reported_not_swallowed() {
        let err = parse_query_results("<results><result>").expect_err("must fail");
        assert_eq!(err.kind, shared::error::ErrorKind::Api);
        assert!(err.cause.is_some());
    }
}
