use quick_xml::events::Event;
use quick_xml::Reader;

// Synthetic root so sibling records parse as one tree.
const ROOT_TAG: &str = "ARTICLES";

/// Extract the text content of every `body_tag` element, in document order.
///
/// The reader runs leniently: end-name checking is off and unmatched closing
/// tags are allowed, so literal `<`/`>` mixed into article text alongside
/// their `&lt;`/`&gt;` forms produce junk elements instead of aborting the
/// batch. A segment is all text between a `body_tag` start and its matching
/// end, inline tags dropped; text that fails entity resolution is kept
/// verbatim. Tag names are matched case-sensitively.
pub fn split(sanitized: &str, body_tag: &str) -> Result<Vec<String>, quick_xml::Error> {
    let wrapped = format!("<{ROOT_TAG}>{sanitized}</{ROOT_TAG}>");
    let mut reader = Reader::from_str(&wrapped);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let tag = body_tag.as_bytes();
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == tag => depth += 1,
            Event::End(e) if e.name().as_ref() == tag && depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    segments.push(std::mem::take(&mut current));
                }
            }
            Event::Empty(e) if e.name().as_ref() == tag => segments.push(String::new()),
            Event::Text(e) if depth > 0 => match e.unescape() {
                Ok(text) => current.push_str(&text),
                Err(_) => current.push_str(&String::from_utf8_lossy(&e)),
            },
            Event::CData(e) if depth > 0 => current.push_str(&String::from_utf8_lossy(&e)),
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let segments = split("<BODY>first</BODY><BODY>second</BODY><BODY>third</BODY>", "BODY")
            .unwrap();
        assert_eq!(segments, vec!["first", "second", "third"]);
    }

    #[test]
    fn inline_tags_dropped() {
        let segments = split("<BODY>Hello <B>World</B>!</BODY>", "BODY").unwrap();
        assert_eq!(segments, vec!["Hello World!"]);
    }

    #[test]
    fn surrounding_elements_ignored() {
        let sgm = "<REUTERS><TITLE>COCOA</TITLE><BODY>Showers continued.</BODY></REUTERS>\
                   <REUTERS><BODY>Good afternoon.</BODY></REUTERS>";
        let segments = split(sgm, "BODY").unwrap();
        assert_eq!(segments, vec!["Showers continued.", "Good afternoon."]);
    }

    #[test]
    fn escaped_brackets_resolve() {
        let segments = split("<BODY>Price &lt;up&gt; today</BODY>", "BODY").unwrap();
        assert_eq!(segments, vec!["Price <up> today"]);
    }

    #[test]
    fn mixed_literal_and_escaped_brackets() {
        // &lt;SRD> resolves to text while the literal <C> becomes a junk
        // element whose tag is dropped
        let segments = split("<BODY>Oil &lt;SRD> and <C> units</BODY>", "BODY").unwrap();
        assert_eq!(segments, vec!["Oil <SRD> and  units"]);
    }

    #[test]
    fn unmatched_close_tolerated() {
        let segments = split("<BODY>a</STRAY>b</BODY>", "BODY").unwrap();
        assert_eq!(segments, vec!["ab"]);
    }

    #[test]
    fn empty_bodies() {
        let segments = split("<BODY></BODY><BODY/>", "BODY").unwrap();
        assert_eq!(segments, vec!["", ""]);
    }

    #[test]
    fn no_bodies_no_segments() {
        let segments = split("<TITLE>nothing here</TITLE>", "BODY").unwrap();
        assert!(segments.is_empty());
    }

    #[test]
    fn tag_match_is_case_sensitive() {
        let segments = split("<body>lower</body><BODY>upper</BODY>", "BODY").unwrap();
        assert_eq!(segments, vec!["upper"]);
    }

    #[test]
    fn multiline_body_text_kept() {
        let segments = split("<BODY>Standard Oil Co and BP North America\nInc said</BODY>", "BODY")
            .unwrap();
        assert_eq!(segments, vec!["Standard Oil Co and BP North America\nInc said"]);
    }
}
