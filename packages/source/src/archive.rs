//! ZIP archive extraction.

use std::io::Cursor;

use mobility_map_table::{DataFrame, read_csv};

use crate::FetchError;

/// Parses the first `.csv` member of a ZIP archive into a [`DataFrame`].
///
/// Members are scanned in archive order. `path` only labels errors.
///
/// # Errors
///
/// * [`FetchError::ArchiveFormat`] if `bytes` is not a readable archive.
/// * [`FetchError::NoDataFound`] if no member name ends with `.csv`.
/// * [`FetchError::Parse`] if the CSV member is malformed.
pub fn read_first_csv(bytes: &[u8], path: &str) -> Result<DataFrame, FetchError> {
    let format_error = |e: zip::result::ZipError| FetchError::ArchiveFormat {
        path: path.to_string(),
        message: e.to_string(),
    };

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(format_error)?;

    for i in 0..archive.len() {
        let entry = archive.by_index(i).map_err(format_error)?;
        let name = entry.name().to_string();
        if !name.ends_with(".csv") {
            log::debug!("Skipping archive member {name}");
            continue;
        }

        log::debug!("Reading {name} from {path} ({} bytes)", entry.size());
        let df = read_csv(entry).map_err(|e| {
            FetchError::Parse {
                path: path.to_string(),
                member: name.clone(),
                source: e,
            }
        })?;
        return Ok(df);
    }

    Err(FetchError::NoDataFound {
        path: path.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use super::*;

    pub(crate) fn zip_bytes(members: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        for (name, content) in members {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn reads_first_csv_member() {
        let bytes = zip_bytes(&[
            ("readme.txt", "not data"),
            ("data.csv", "id,value\n1,100\n2,200\n"),
        ]);

        let table = read_first_csv(&bytes, "test.zip").unwrap();

        assert_eq!(table.get_column_names(), ["id", "value"]);
        let ints = |column: &str| -> Vec<Option<i64>> {
            table.column(column).unwrap().i64().unwrap().into_iter().collect()
        };
        assert_eq!(ints("id"), [Some(1), Some(2)]);
        assert_eq!(ints("value"), [Some(100), Some(200)]);
    }

    #[test]
    fn picks_earliest_csv_in_archive_order() {
        let bytes = zip_bytes(&[("b.csv", "x\n1\n"), ("a.csv", "y\n2\n")]);

        let table = read_first_csv(&bytes, "test.zip").unwrap();

        assert_eq!(table.get_column_names(), ["x"]);
    }

    #[test]
    fn archive_without_csv_has_no_data() {
        let bytes = zip_bytes(&[("readme.txt", "nothing here")]);

        let err = read_first_csv(&bytes, "test.zip").unwrap_err();

        assert!(matches!(err, FetchError::NoDataFound { path } if path == "test.zip"));
    }

    #[test]
    fn garbage_is_an_archive_format_error() {
        let err = read_first_csv(b"definitely not a zip", "test.zip").unwrap_err();

        assert!(matches!(err, FetchError::ArchiveFormat { .. }));
    }
}
