//! Rewrites a PrestaShop product XML document for a partial update.
//!
//! The update endpoint takes the full product document back, so the
//! rewrite must keep everything except the price byte-faithful. Two
//! read-only children (`manufacturer_name`, `quantity`) are rejected
//! on PUT and get dropped.

use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{SyncError, SyncResult};

/// Direct `product` children the update endpoint rejects
const STRIPPED_FIELDS: [&str; 2] = ["manufacturer_name", "quantity"];

/// Replace the text of `/prestashop/product/price` with `net_price`
/// and drop the stripped fields. Elements with the same names nested
/// deeper (e.g. stock availability quantities) are left untouched.
pub fn rewrite_product_xml(xml: &str, net_price: &str) -> SyncResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut path: Vec<String> = Vec::new();
    let mut in_price = false;
    let mut price_found = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if element_path(&path, &["prestashop", "product"])
                    && STRIPPED_FIELDS.contains(&name.as_str())
                {
                    reader.read_to_end(e.name())?;
                    continue;
                }
                path.push(name);
                writer.write_event(Event::Start(e))?;
                if element_path(&path, &["prestashop", "product", "price"]) {
                    in_price = true;
                    price_found = true;
                    writer.write_event(Event::Text(BytesText::new(net_price)))?;
                }
            }
            Event::End(e) => {
                path.pop();
                in_price = false;
                writer.write_event(Event::End(e))?;
            }
            Event::Empty(e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if element_path(&path, &["prestashop", "product"])
                    && STRIPPED_FIELDS.contains(&name.as_str())
                {
                    continue;
                }
                writer.write_event(Event::Empty(e))?;
            }
            // The original price text (plain or CDATA) is dropped in
            // favor of the replacement written at the start tag.
            Event::Text(e) => {
                if !in_price {
                    writer.write_event(Event::Text(e))?;
                }
            }
            Event::CData(e) => {
                if !in_price {
                    writer.write_event(Event::CData(e))?;
                }
            }
            Event::Eof => break,
            other => writer.write_event(other)?,
        }
    }

    if !price_found {
        return Err(SyncError::MissingField("product price element"));
    }
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

fn element_path(path: &[String], expected: &[&str]) -> bool {
    path.len() == expected.len()
        && path
            .iter()
            .zip(expected)
            .all(|(actual, want)| actual.as_str() == *want)
}

#[cfg(test)]
#[path = "product_xml_tests.rs"]
mod tests;
