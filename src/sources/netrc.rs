use std::collections::BTreeMap;

/// One `machine` block of a netrc file, keyed by field name.
pub type SourceRecord = BTreeMap<String, String>;

/// Parse netrc contents into one record per `machine` block.
///
/// Fields may sit on one line or be spread over several. `default` opens a
/// record whose machine is `default`; anything before the first block and
/// `#` comment lines are ignored. A `macdef` body runs up to the next blank
/// line and is skipped.
pub fn parse(contents: &str) -> Vec<SourceRecord> {
    let mut records: Vec<SourceRecord> = Vec::new();
    let mut key: Option<&str> = None;
    let mut in_macro = false;

    for line in contents.lines() {
        if in_macro {
            in_macro = !line.trim().is_empty();
            continue;
        }
        if line.trim_start().starts_with('#') {
            continue;
        }

        for word in line.split_whitespace() {
            match key.take() {
                Some("macdef") => {
                    in_macro = true;
                    break;
                }
                Some(field) => {
                    if field == "machine" {
                        records.push(SourceRecord::new());
                    }
                    if let Some(record) = records.last_mut() {
                        record.insert(field.to_string(), word.to_string());
                    }
                }
                None if word == "default" => records.push(SourceRecord::from([(
                    "machine".to_string(),
                    "default".to_string(),
                )])),
                None => key = Some(word),
            }
        }
    }

    records
}

/// Whether a record belongs to either of the given hosts.
pub fn matches_host(record: &SourceRecord, api_host: &str, host: &str) -> bool {
    record
        .get("machine")
        .is_some_and(|machine| machine == api_host || machine == host)
}
