//! Command implementation for the spanspy CLI.

use crate::sample::SAMPLE_DDL;
use crate::OutputFormat;
use anyhow::{Context, Result};
use spanspy_builder::build_schema;
use spanspy_core::Schema;
use spanspy_ddl::parse_ddls;
use spanspy_diagram::Report;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, info};

/// Where the document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
    /// The built-in demo schema.
    Sample,
}

impl Input {
    /// A missing path and `-` both mean stdin.
    pub fn from_arg(path: Option<PathBuf>) -> Self {
        match path {
            Some(path) if path.as_os_str() != "-" => Input::File(path),
            _ => Input::Stdin,
        }
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> String {
        match self {
            Input::Stdin => "<stdin>".to_string(),
            Input::File(path) => path.display().to_string(),
            Input::Sample => "<sample>".to_string(),
        }
    }

    fn read(&self) -> Result<String> {
        let text = match self {
            Input::Stdin => {
                let mut text = String::new();
                io::stdin().read_to_string(&mut text).map(|_| text)
            }
            Input::File(path) => fs::read_to_string(path),
            Input::Sample => Ok(SAMPLE_DDL.to_string()),
        };
        text.with_context(|| self.name())
    }
}

#[derive(Debug, Clone)]
pub struct Options {
    pub input: Input,
    /// Destination file; stdout when `None`.
    pub output: Option<PathBuf>,
    pub pretty: bool,
    pub format: OutputFormat,
    pub from_json: bool,
}

/// Read, build and write the requested output.
pub fn run(options: &Options) -> Result<()> {
    let output = execute(options)?;
    match &options.output {
        Some(path) => {
            fs::write(path, &output).with_context(|| path.display().to_string())?;
            info!(path = %path.display(), bytes = output.len(), "wrote output");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Produce the full output document, trailing newline included.
pub fn execute(options: &Options) -> Result<String> {
    let text = options.input.read()?;
    let schema = load_schema(&options.input.name(), &text, options.from_json)?;
    debug!(
        tables = schema.tables.len(),
        foreign_keys = schema.foreign_keys().len(),
        indexes = schema.indexes().len(),
        "schema ready"
    );

    let mut output = render(Report::new(schema), options.format, options.pretty)?;
    output.push('\n');
    Ok(output)
}

/// Build a schema from DDL text, or decode an exported one.
///
/// Exported documents get their unnamed foreign keys named.
pub fn load_schema(source_name: &str, text: &str, from_json: bool) -> Result<Schema> {
    if from_json {
        let mut schema: Schema = serde_json::from_str(text).map_err(spanspy_core::Error::from)?;
        schema.fill_foreign_key_names();
        return Ok(schema);
    }
    let ddls = parse_ddls(source_name, text)?;
    debug!(statements = ddls.len(), source = source_name, "parsed DDL");
    Ok(build_schema(&ddls)?)
}

fn render(report: Report, format: OutputFormat, pretty: bool) -> Result<String> {
    let output = match format {
        OutputFormat::Schema => report.schema_json(pretty)?,
        OutputFormat::Diagram => report.diagram_json(pretty)?,
        OutputFormat::Mermaid => report.mermaid(),
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const DDL: &str = "
        CREATE TABLE Users (
          Id STRING(36) NOT NULL,
          Name STRING(100),
        ) PRIMARY KEY (Id);

        CREATE TABLE Orders (
          OrderId STRING(36) NOT NULL,
          UserId STRING(36),
          FOREIGN KEY (UserId) REFERENCES Users (Id),
        ) PRIMARY KEY (OrderId);
    ";

    fn ddl_file(text: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    fn options(file: &NamedTempFile, format: OutputFormat) -> Options {
        Options {
            input: Input::File(file.path().to_path_buf()),
            output: None,
            pretty: false,
            format,
            from_json: false,
        }
    }

    #[test]
    fn test_input_from_arg() {
        assert_eq!(Input::from_arg(None), Input::Stdin);
        assert_eq!(Input::from_arg(Some(PathBuf::from("-"))), Input::Stdin);
        assert_eq!(
            Input::from_arg(Some(PathBuf::from("schema.sql"))),
            Input::File(PathBuf::from("schema.sql"))
        );
        assert_eq!(Input::Stdin.name(), "<stdin>");
    }

    #[test]
    fn test_execute_schema() {
        let file = ddl_file(DDL);
        let output = execute(&options(&file, OutputFormat::Schema)).unwrap();
        assert!(output.ends_with("}\n"));

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["tables"].as_array().unwrap().len(), 2);
        assert_eq!(value["foreignKeys"][0]["name"], "Orders_UserId_fk");
        assert!(value.get("indexes").is_none());
    }

    #[test]
    fn test_execute_pretty() {
        let file = ddl_file("CREATE TABLE T (A INT64) PRIMARY KEY (A)");
        let output = execute(&Options {
            pretty: true,
            ..options(&file, OutputFormat::Schema)
        })
        .unwrap();
        assert!(output.starts_with("{\n  \"tables\": ["));
        assert!(output.ends_with("}\n"));
    }

    #[test]
    fn test_execute_mermaid() {
        let file = ddl_file(DDL);
        let output = execute(&options(&file, OutputFormat::Mermaid)).unwrap();
        assert_eq!(
            output,
            "erDiagram
  Users {
    *Id: STRING(36)!
    Name: STRING(100)?
  }
  Orders {
    *OrderId: STRING(36)!
    UserId: STRING(36)?
  }
  Orders }o--|| Users : Orders_UserId_fk
"
        );
    }

    #[test]
    fn test_execute_diagram_from_exported_schema() {
        let ddl = ddl_file(DDL);
        let exported = execute(&options(&ddl, OutputFormat::Schema)).unwrap();

        let json = ddl_file(&exported);
        let from_json = execute(&Options {
            from_json: true,
            ..options(&json, OutputFormat::Diagram)
        })
        .unwrap();
        let direct = execute(&options(&ddl, OutputFormat::Diagram)).unwrap();
        assert_eq!(from_json, direct);
    }

    #[test]
    fn test_exported_schema_with_unnamed_foreign_key() {
        let exported = r#"{
            "tables": [
                {"name": "A", "columns": [{"name": "BId", "type": "INT64"}], "primaryKey": []},
                {"name": "B", "columns": [{"name": "Id", "type": "INT64"}], "primaryKey": ["Id"]}
            ],
            "foreignKeys": [{
                "name": "",
                "referencingTable": "A",
                "referencingColumns": ["BId"],
                "referencedTable": "B",
                "referencedColumns": ["Id"]
            }]
        }"#;
        let schema = load_schema("<stdin>", exported, true).unwrap();
        assert_eq!(schema.foreign_keys()[0].name, "A_B");

        let mermaid = Report::new(schema).mermaid();
        assert!(mermaid.ends_with("\n  A }o--|| B : A_B"));
    }

    #[test]
    fn test_execute_sample() {
        let output = execute(&Options {
            input: Input::Sample,
            output: None,
            pretty: false,
            format: OutputFormat::Mermaid,
            from_json: false,
        })
        .unwrap();
        assert!(output.starts_with("erDiagram\n  Singers {\n    *SingerId: INT64!\n    FirstName: STRING?\n"));
        assert!(output.ends_with(
            "  Albums }o--|| Singers : fk_albums_singers\n  Albums }o--|| Singers : INTERLEAVED IN\n"
        ));
    }

    #[test]
    fn test_run_writes_output_file() {
        let ddl = ddl_file(DDL);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.mmd");

        run(&Options {
            output: Some(path.clone()),
            ..options(&ddl, OutputFormat::Mermaid)
        })
        .unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("erDiagram\n"));
        assert!(written.ends_with("Orders }o--|| Users : Orders_UserId_fk\n"));
    }

    #[test]
    fn test_run_reports_unwritable_output() {
        let ddl = ddl_file(DDL);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");

        let err = run(&Options {
            output: Some(path.clone()),
            ..options(&ddl, OutputFormat::Schema)
        })
        .unwrap_err();
        assert!(format!("{err:#}").starts_with(&format!("{}: ", path.display())));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sql");
        let err = execute(&Options {
            input: Input::File(path.clone()),
            output: None,
            pretty: false,
            format: OutputFormat::Schema,
            from_json: false,
        })
        .unwrap_err();
        assert_eq!(err.to_string(), path.display().to_string());
        assert!(format!("{err:#}").starts_with(&format!("{}: ", path.display())));
    }

    #[test]
    fn test_syntax_error_names_source() {
        let file = ddl_file("CREATE TABLE T (A STRING(abc)) PRIMARY KEY (A)");
        let err = execute(&options(&file, OutputFormat::Schema)).unwrap_err();
        assert_eq!(
            format!("{err:#}"),
            format!(
                "{}:1:26: expected integer, parameter or CAST but found 'abc'",
                file.path().display()
            )
        );
    }

    #[test]
    fn test_builder_error() {
        let file = ddl_file("ALTER TABLE Ghost ADD COLUMN A INT64");
        let err = execute(&options(&file, OutputFormat::Schema)).unwrap_err();
        assert_eq!(format!("{err:#}"), "ALTER TABLE references unknown table \"Ghost\"");
    }

    #[test]
    fn test_invalid_json_input() {
        let err = load_schema("<stdin>", "not json", true).unwrap_err();
        assert!(format!("{err:#}").starts_with("serialization error: expected"));
    }
}
