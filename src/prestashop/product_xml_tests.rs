//! Tests for the product XML rewrite.

use super::*;

const PRODUCT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<prestashop xmlns:xlink="http://www.w3.org/1999/xlink">
<product>
<id><![CDATA[5]]></id>
<price><![CDATA[123.000000]]></price>
<manufacturer_name><![CDATA[Acme]]></manufacturer_name>
<quantity><![CDATA[7]]></quantity>
<name><language id="1"><![CDATA[Widget]]></language></name>
<associations><stock_availables><stock_available><quantity><![CDATA[7]]></quantity></stock_available></stock_availables></associations>
</product>
</prestashop>"#;

#[test]
fn replaces_price_text() {
    let result = rewrite_product_xml(PRODUCT_XML, "100.00").unwrap();
    assert!(result.contains("<price>100.00</price>"));
    assert!(!result.contains("123.000000"));
}

#[test]
fn strips_fields_rejected_on_update() {
    let result = rewrite_product_xml(PRODUCT_XML, "100.00").unwrap();
    assert!(!result.contains("manufacturer_name"));
    assert!(!result.contains("Acme"));
    // Only the direct product child is dropped
    assert_eq!(result.matches("<quantity>").count(), 1);
}

#[test]
fn keeps_nested_quantity_elements() {
    let result = rewrite_product_xml(PRODUCT_XML, "100.00").unwrap();
    assert!(result.contains("<stock_available><quantity><![CDATA[7]]></quantity></stock_available>"));
}

#[test]
fn keeps_unrelated_elements_and_attributes() {
    let result = rewrite_product_xml(PRODUCT_XML, "100.00").unwrap();
    assert!(result.contains("<![CDATA[5]]>"));
    assert!(result.contains(r#"<language id="1"><![CDATA[Widget]]></language>"#));
    assert!(result.contains(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(result.contains(r#"<prestashop xmlns:xlink="http://www.w3.org/1999/xlink">"#));
}

#[test]
fn handles_self_closed_stripped_fields() {
    let xml = r#"<prestashop><product><price>1.00</price><manufacturer_name/><quantity/></product></prestashop>"#;
    let result = rewrite_product_xml(xml, "0.81").unwrap();
    assert!(!result.contains("manufacturer_name"));
    assert!(!result.contains("quantity"));
    assert!(result.contains("<price>0.81</price>"));
}

#[test]
fn missing_price_element_errors() {
    let xml = "<prestashop><product><id>5</id></product></prestashop>";
    let result = rewrite_product_xml(xml, "100.00");
    match result.unwrap_err() {
        SyncError::MissingField(field) => assert_eq!(field, "product price element"),
        other => panic!("Expected SyncError::MissingField, got: {other:?}"),
    }
}

#[test]
fn malformed_xml_errors() {
    let result = rewrite_product_xml("<prestashop><product>", "100.00");
    assert!(result.is_err());
}

#[test]
fn price_outside_product_is_not_replaced() {
    let xml = "<prestashop><meta><price>9.99</price></meta><product><price>1.00</price></product></prestashop>";
    let result = rewrite_product_xml(xml, "0.81").unwrap();
    assert!(result.contains("<price>9.99</price>"));
    assert!(result.contains("<price>0.81</price>"));
}
