use crate::error::FinsheetError;
use crate::error::ResultMessage;
use crate::helpers::reader::SourceReader;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::excel::Package;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::Worksheet;
use crate::spreadsheet::Spreadsheet;
use crate::spreadsheet::SpreadsheetError;
use crate::spreadsheet::Workbook;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufReader;
use std::path::Path;
use zip::read::ZipFile;
use zip::ZipArchive;

// XML tag names for parsing Excel XLSX format
const TAG_CUSTOM_FORMATS: QName = QName(b"numFmts"); // Custom number formats container
const TAG_CUSTOM_FORMAT: QName = QName(b"numFmt");   // Individual custom number format
const TAG_FORMAT_INDEXES: QName = QName(b"cellXfs");  // Cell format indexes container
const TAG_FORMAT_INDEX: QName = QName(b"xf");         // Individual cell format index
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");   // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");       // Phonetic text for Asian languages
const TAG_TEXT: QName = QName(b"t");                  // Text content within strings
const TAG_WORKBOOK_PROPERTIES: QName = QName(b"workbookPr");
const TAG_SHEET: QName = QName(b"sheet");
const TAG_ROW: QName = QName(b"row");
const TAG_CELL: QName = QName(b"c");
const TAG_INLINE_STRING: QName = QName(b"is");
const TAG_VALUE: QName = QName(b"v");

/// An opened Excel xlsx/xlsm package
pub struct XlsxSpreadsheet {
    /// File name of the spreadsheet
    name: String,
    zip: ZipArchive<SourceReader>,
    number_formats: Vec<CellType>,
    /// Worksheets as (name, zip_path) pairs in workbook order
    sheets: Vec<(String, String)>,
    is_1904: bool,
}

impl XlsxSpreadsheet {
    /// Opens an xlsx package from disk and parses its structure
    pub fn open(path: &Path) -> Result<XlsxSpreadsheet, FinsheetError> {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        Self::from_reader(&name, SourceReader::open(path)?)
    }

    /// Opens an xlsx package already held in memory
    pub fn from_bytes(name: &str, bytes: Vec<u8>) -> Result<XlsxSpreadsheet, FinsheetError> {
        Self::from_reader(name, SourceReader::from_bytes(bytes))
    }

    fn from_reader(name: &str, reader: SourceReader) -> Result<XlsxSpreadsheet, FinsheetError> {
        let Package { zip, number_formats, sheets, is_1904 } =
            excel::open(name, reader, load_workbook, load_number_formats)?;
        Ok(XlsxSpreadsheet {
            name: name.to_owned(),
            zip,
            number_formats,
            sheets,
            is_1904,
        })
    }

    /// Loads the whole shared string table.
    fn load_shared_strings(&mut self) -> Result<Vec<String>, FinsheetError> {
        let mut shared_strings = Vec::<String>::new();
        let mut reader = match self.zip.xml_reader("xl/sharedStrings.xml")? {
            Some(reader) => reader,
            None => return Ok(shared_strings),
        };
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
                shared_strings.push(read_string_value(&mut reader, TAG_SHARED_STRING_ITEM, false)?);
            }
        });
        Ok(shared_strings)
    }

    /// Decodes one worksheet part into a grid.
    fn read_sheet(&mut self, sheet_name: &str, zip_path: &str, shared_strings: &[String]) -> Result<Worksheet, FinsheetError> {
        let mut sheet = Worksheet::new(sheet_name);
        let mut row_count = 0usize;
        let mut col_count = 0usize;
        let mut row = 0usize;
        let mut col = 0usize;
        let mut kind = CellType::default();
        let mut value = String::new();
        let mut reader = self.zip.xml_reader(zip_path)?
            .ok_or_else(|| SpreadsheetError::FileError(zip_path.to_owned()))?;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == TAG_ROW => {
                row_count = event.get_attribute_value("r")?
                    .and_then(|r| r.parse::<usize>().ok())
                    .unwrap_or(row_count + 1);
                col_count = 0;
            }
            Event::Start(event) if event.name() == TAG_CELL => {
                col_count += 1;
                (row, col) = event.get_attribute_value("r")?
                    .and_then(|reference| reference_to_index(&reference))
                    .unwrap_or((row_count, col_count));
                col_count = col;
                kind = event.get_attribute_value("t")?.map(|t| {
                    match &*t {
                        "inlineStr" | "str" => CellType::InlineString,
                        "s" => CellType::SharedString,
                        "d" => CellType::IsoDateTime,
                        "b" => CellType::Boolean,
                        "e" => CellType::Error,
                        _ => CellType::Number,
                    }
                }).unwrap_or(CellType::Number);
                if let Some(format_id) = event.get_attribute_value("s")? {
                    if kind == CellType::Number && !format_id.is_empty() {
                        let index = format_id.parse::<usize>()?;
                        kind = self.number_formats.get(index).copied().unwrap_or(CellType::Number);
                    }
                }
                value.clear();
            }
            Event::Start(event) if event.name() == TAG_INLINE_STRING => {
                value = read_string_value(&mut reader, TAG_INLINE_STRING, false)?;
            }
            Event::Start(event) if event.name() == TAG_VALUE => {
                value = read_string_value(&mut reader, TAG_VALUE, true)?;
            }
            Event::End(event) if event.name() == TAG_CELL => {
                if !value.is_empty() {
                    let decoded = kind.to_value(&value, shared_strings, self.is_1904)?;
                    sheet.push(Cell::new(row, col, decoded));
                }
                kind = CellType::default();
                value.clear();
            }
        });
        sheet.finish();
        Ok(sheet)
    }
}

impl Spreadsheet for XlsxSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|(name, _)| name.to_owned()).collect()
    }

    fn read_workbook(&mut self, criteria: &Criteria) -> Result<Workbook, FinsheetError> {
        let selected: Vec<(String, String)> = self
            .sheets
            .iter()
            .filter(|(name, _)| criteria.accept(name))
            .cloned()
            .collect();
        let shared_strings = if selected.is_empty() {
            Vec::new()
        } else {
            self.load_shared_strings()?
        };
        let mut worksheets = Vec::with_capacity(selected.len());
        for (sheet_name, zip_path) in &selected {
            let sheet = self
                .read_sheet(sheet_name, zip_path, &shared_strings)
                .with_prefix(&format!("Read sheet '{}' of '{}'", sheet_name, self.name))?;
            log::debug!("Read sheet '{}' with {} cells", sheet_name, sheet.cells().count());
            worksheets.push(sheet);
        }
        Ok(Workbook::new(&self.name, worksheets))
    }
}

/// Reads worksheet names, their part paths and the date system from workbook.xml
fn load_workbook(zip: &mut ZipArchive<SourceReader>) -> Result<(Vec<(String, String)>, bool), FinsheetError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip.xml_reader("xl/workbook.xml")?
        .ok_or_else(|| SpreadsheetError::FileError("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    let mut is_1904 = false;
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.unescape_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.unescape_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&*id) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
        Event::Start(event) if event.name() == TAG_WORKBOOK_PROPERTIES => {
            is_1904 = event.get_attribute_value("date1904")?
                .map(|value| value.eq("1") || value.eq("true"))
                .unwrap_or(false);
        }
    });
    Ok((sheets, is_1904))
}

/// Reads custom number formats and the cellXfs table from styles.xml
fn load_number_formats(zip: &mut ZipArchive<SourceReader>) -> Result<Vec<CellType>, FinsheetError> {
    let mut reader = match zip.xml_reader("xl/styles.xml")? {
        Some(reader) => reader,
        None => return Ok(Vec::new()),
    };

    let mut custom_formats_context = false;
    let mut custom_formats = HashMap::<String, CellType>::new();
    let mut format_indexes_context = false;
    let mut format_indexes = Vec::<String>::new();

    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = true,
        Event::End(event) if event.name() == TAG_CUSTOM_FORMATS => custom_formats_context = false,
        Event::Start(event) if custom_formats_context && event.name() == TAG_CUSTOM_FORMAT => {
            let id = event.get_attribute_value("numFmtId")?;
            let format = event.get_attribute_value("formatCode")?;
            if let Some((id, format)) = id.zip(format) {
                custom_formats.insert(id.to_string(), CellType::parse_custom_number_format(&format));
            }
        }
        Event::Start(event) if event.name() == TAG_FORMAT_INDEXES => format_indexes_context = true,
        Event::End(event) if event.name() == TAG_FORMAT_INDEXES => break,
        Event::Start(event) if format_indexes_context && event.name() == TAG_FORMAT_INDEX => {
            let id = event.get_attribute_value("numFmtId")?;
            format_indexes.push(id.map(|id| id.to_string()).unwrap_or_else(|| "0".to_owned()));
        }
    });

    Ok(excel::resolve_number_formats(format_indexes, custom_formats))
}

/// Reads string content up to `end_tag`, skipping phonetic runs
///
/// # Arguments
/// * `reader` - XML reader positioned just after the opening tag
/// * `end_tag` - Tag that closes the string content
/// * `is_text_content` - Whether direct text counts without a `<t>` wrapper
fn read_string_value(
    reader: &mut XmlReader<BufReader<ZipFile<'_, SourceReader>>>,
    end_tag: QName,
    is_text_content: bool,
) -> Result<String, FinsheetError> {
    let mut is_phonetic_text = false;
    let mut is_text = is_text_content;
    let mut text = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == end_tag => break,
        Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
        Event::End(event) if event.name() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
        Event::Start(event) if !is_phonetic_text && event.name() == TAG_TEXT => is_text = true,
        Event::End(event) if is_text && event.name() == TAG_TEXT => is_text = false,
        Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
        Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
        Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
    });
    Ok(text)
}
