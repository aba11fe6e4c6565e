//! Builds small but genuine xlsx packages for the integration tests.
#![allow(dead_code)]

use finsheet::spreadsheet::reference::column_to_letters;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// A cell written into a test workbook.
#[derive(Clone, Debug)]
pub enum Value {
    Text(&'static str),
    Number(f64),
    Empty,
}

pub use Value::{Empty, Number, Text};

pub type Rows = Vec<Vec<Value>>;

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn sheet_xml(rows: &Rows) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (row_index, row) in rows.iter().enumerate() {
        let row_number = row_index + 1;
        xml.push_str(&format!(r#"<row r="{}">"#, row_number));
        for (column_index, value) in row.iter().enumerate() {
            let reference = format!("{}{}", column_to_letters(column_index + 1), row_number);
            match value {
                Value::Text(text) => xml.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    reference,
                    escape(text)
                )),
                Value::Number(number) => xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, number)),
                Value::Empty => (),
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

/// Writes a workbook with the given sheets, in order, and returns its path.
pub fn write_workbook(directory: &Path, file_name: &str, sheets: &[(&str, Rows)]) -> PathBuf {
    let path = directory.join(file_name);
    let mut writer = ZipWriter::new(File::create(&path).unwrap());
    let options = SimpleFileOptions::default();

    let mut workbook = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>"#,
    );
    let mut relationships = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for (index, (name, _)) in sheets.iter().enumerate() {
        let id = index + 1;
        workbook.push_str(&format!(r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#, escape(name), id, id));
        relationships.push_str(&format!(
            r#"<Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            id, id
        ));
    }
    workbook.push_str("</sheets></workbook>");
    relationships.push_str("</Relationships>");

    writer.start_file("xl/workbook.xml", options).unwrap();
    writer.write_all(workbook.as_bytes()).unwrap();
    writer.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    writer.write_all(relationships.as_bytes()).unwrap();
    for (index, (_, rows)) in sheets.iter().enumerate() {
        writer
            .start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)
            .unwrap();
        writer.write_all(sheet_xml(rows).as_bytes()).unwrap();
    }
    writer.finish().unwrap();
    path
}

/// The two-sheet workbook of the Acme example.
pub fn acme_sheets() -> Vec<(&'static str, Rows)> {
    vec![
        ("i_Setup", vec![vec![Text("Company Name"), Text("Acme Corp")]]),
        (
            "i_COS",
            vec![
                vec![Text("Product"), Text("Weighting")],
                vec![Text("A"), Number(0.4)],
                vec![Text("B"), Number(0.25)],
                vec![Text("C"), Number(0.35)],
            ],
        ),
    ]
}
