use super::store::ExtractedField;

pub const FIELD_HEADER: [&str; 3] = ["Field Names", "Field Values", "Confidence"];

/// Render a document's fields as the downloadable CSV artifact: a title row naming the
/// document, the column header, then one row per field.
pub fn render_csv(document_name: &str, fields: &[ExtractedField]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    writer.write_record([format!("Document Name: {document_name}")])?;
    writer.write_record(FIELD_HEADER)?;
    for field in fields {
        let confidence = format!("{:.2}", field.confidence);
        writer.write_record([field.name.as_str(), field.value.as_str(), confidence.as_str()])?;
    }

    writer.into_inner().map_err(|err| {
        let io = err.error();
        csv::Error::from(std::io::Error::new(io.kind(), io.to_string()))
    })
}
