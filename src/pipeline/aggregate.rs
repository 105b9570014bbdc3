use quick_xml::events::Event;
use quick_xml::Reader;

use crate::entity::{EntityCounts, EntityType};

const ROOT_TAG: &str = "SPANS";

/// Re-parse a tagged segment and tally every entity span by type.
///
/// Every non-root element is a span of its tag name. Text inside nested spans
/// accrues to every open span. Spans still open at end of input are dropped,
/// as are empty-element spans. Stateless: nothing carries over between calls.
pub fn aggregate(tagged: &str) -> Result<EntityCounts, quick_xml::Error> {
    let wrapped = format!("<{ROOT_TAG}>{tagged}</{ROOT_TAG}>");
    let mut reader = Reader::from_str(&wrapped);
    let config = reader.config_mut();
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut counts = EntityCounts::default();
    let mut open: Vec<(EntityType, String)> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() != ROOT_TAG.as_bytes() => {
                let label = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                open.push((EntityType::from_label(&label), String::new()));
            }
            Event::End(e) if e.name().as_ref() != ROOT_TAG.as_bytes() => {
                if let Some((ty, text)) = open.pop() {
                    counts.record(&ty, &text);
                }
            }
            Event::Text(e) if !open.is_empty() => {
                let text = match e.unescape() {
                    Ok(t) => t.into_owned(),
                    Err(_) => String::from_utf8_lossy(&e).into_owned(),
                };
                for (_, buf) in open.iter_mut() {
                    buf.push_str(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(counts)
}
