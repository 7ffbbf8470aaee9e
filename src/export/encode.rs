use super::project::{ExportRow, SERIAL_COLUMN};
use crate::error::{GhReportError, Result};
use csv::{QuoteStyle, WriterBuilder};

/// CSV text for `rows`: an unquoted `slno,<fields>` header, then one record
/// per row with every value quoted. No rows gives an empty string.
pub fn to_csv(rows: &[ExportRow], fields: &[String]) -> Result<String> {
    if rows.is_empty() {
        return Ok(String::new());
    }

    let columns: Vec<&str> = std::iter::once(SERIAL_COLUMN)
        .chain(fields.iter().map(String::as_str))
        .collect();

    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(Vec::new());
    for row in rows {
        wtr.write_record(columns.iter().map(|c| row.get(c).unwrap_or("")))?;
    }
    let body = String::from_utf8(wtr.into_inner()?)
        .map_err(|e| GhReportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;

    let mut out = columns.join(",");
    out.push('\n');
    out.push_str(body.strip_suffix('\n').unwrap_or(&body));
    Ok(out)
}

pub fn to_json(rows: &[ExportRow]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::project::to_flat_rows;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn fields(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_rows_encode_to_empty_string() {
        assert_eq!(to_csv(&[], &fields(&["number"])).unwrap(), "");
    }

    #[test]
    fn every_value_is_quoted() {
        let rows = to_flat_rows(&json!([{"number": 7, "title": "Add \"x\""}]), &fields(&["number", "title"])).unwrap();
        assert_eq!(to_csv(&rows, &fields(&["number", "title"])).unwrap(), "slno,number,title\n\"1\",\"7\",\"Add \"\"x\"\"\"");
    }

    #[test]
    fn csv_survives_a_parser_round_trip() {
        let selected = fields(&["title", "labels"]);
        let records = json!([
            {"title": "commas, inside", "labels": [{"name": "a"}, {"name": "b"}]},
            {"title": "line\nbreak and \"quotes\"", "labels": []}
        ]);
        let rows = to_flat_rows(&records, &selected).unwrap();
        let text = to_csv(&rows, &selected).unwrap();

        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
        assert_eq!(headers, ["slno", "title", "labels"]);
        let parsed: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect();
        assert_eq!(
            parsed,
            vec![
                vec!["1".to_string(), "commas, inside".to_string(), "a, b".to_string()],
                vec!["2".to_string(), "line\nbreak and \"quotes\"".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn json_is_an_array_of_ordered_objects() {
        let rows = to_flat_rows(&json!([{"number": 1, "title": "t"}]), &fields(&["title", "number"])).unwrap();
        let text = to_json(&rows).unwrap();
        let title_at = text.find("\"title\"").unwrap();
        let number_at = text.find("\"number\"").unwrap();
        assert!(text.find("\"slno\"").unwrap() < title_at);
        assert!(title_at < number_at);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["number"], "1");
    }
}
