//! Result aggregation actions.

use std::collections::HashSet;
use std::path::PathBuf;

use csv::StringRecord;
use indexmap::{IndexMap, IndexSet};
use log::info;

use hybridlab_flow::action::{Action, TaskContext};
use hybridlab_flow::error::FlowError;

fn aggregate(ctx: &TaskContext, message: String) -> FlowError {
    FlowError::Aggregate {
        task: ctx.name.clone(),
        message,
    }
}

fn single_output(ctx: &TaskContext) -> Result<&PathBuf, FlowError> {
    match ctx.outputs.first() {
        Some(path) => Ok(path),
        None => Err(aggregate(ctx, "no output declared".to_string())),
    }
}

/// Stacks per-scenario CSV tables with identical headers into one table.
///
/// Every input must carry the key column; key values must be unique across
/// all inputs, so the output has exactly one row per scenario.
pub struct StackCsv {
    key_column: String,
}

impl StackCsv {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
        }
    }
}

impl Action for StackCsv {
    fn run(&self, ctx: &TaskContext) -> Result<(), FlowError> {
        let output = single_output(ctx)?;
        let mut header: Option<StringRecord> = None;
        let mut key_index = 0;
        let mut seen: HashSet<String> = HashSet::new();
        let mut rows: Vec<StringRecord> = Vec::new();
        for input in ctx.inputs.iter() {
            let mut reader = csv::Reader::from_path(input)
                .map_err(|e| aggregate(ctx, format!("{}: {}", input.display(), e)))?;
            let head = reader
                .headers()
                .map_err(|e| aggregate(ctx, format!("{}: {}", input.display(), e)))?
                .clone();
            match &header {
                None => {
                    key_index = match head.iter().position(|name| name == self.key_column) {
                        Some(index) => index,
                        None => {
                            return Err(aggregate(
                                ctx,
                                format!("{}: no {} column", input.display(), self.key_column),
                            ))
                        }
                    };
                    header = Some(head);
                }
                Some(expected) => {
                    if *expected != head {
                        return Err(aggregate(ctx, format!("{}: header mismatch", input.display())));
                    }
                }
            }
            for record in reader.records() {
                let record = record.map_err(|e| aggregate(ctx, format!("{}: {}", input.display(), e)))?;
                let key = record.get(key_index).unwrap_or("").to_string();
                if !seen.insert(key.clone()) {
                    return Err(aggregate(ctx, format!("duplicate {} {}", self.key_column, key)));
                }
                rows.push(record);
            }
        }
        let header = match header {
            Some(header) => header,
            None => return Err(aggregate(ctx, "no input tables".to_string())),
        };
        let mut writer =
            csv::Writer::from_path(output).map_err(|e| aggregate(ctx, format!("{}: {}", output.display(), e)))?;
        writer
            .write_record(&header)
            .map_err(|e| aggregate(ctx, format!("{}: {}", output.display(), e)))?;
        for row in rows.iter() {
            writer
                .write_record(row)
                .map_err(|e| aggregate(ctx, format!("{}: {}", output.display(), e)))?;
        }
        writer.flush().map_err(|e| FlowError::io(output, e))?;
        info!("{}: stacked {} rows into {}", ctx.name, rows.len(), output.display());
        Ok(())
    }
}

/// Joins two-column `<key>,<run-name>` tables on the key column and
/// transposes the result: one output row per input table, one output column
/// per distinct key value in first-seen order.
pub struct PivotCsv {
    key_column: String,
}

impl PivotCsv {
    pub fn new(key_column: impl Into<String>) -> Self {
        Self {
            key_column: key_column.into(),
        }
    }
}

impl Action for PivotCsv {
    fn run(&self, ctx: &TaskContext) -> Result<(), FlowError> {
        let output = single_output(ctx)?;
        let mut parameters: IndexSet<String> = IndexSet::new();
        let mut runs: Vec<(String, IndexMap<String, String>)> = Vec::new();
        for input in ctx.inputs.iter() {
            let mut reader = csv::Reader::from_path(input)
                .map_err(|e| aggregate(ctx, format!("{}: {}", input.display(), e)))?;
            let head = reader
                .headers()
                .map_err(|e| aggregate(ctx, format!("{}: {}", input.display(), e)))?
                .clone();
            if head.len() != 2 || head.get(0) != Some(self.key_column.as_str()) {
                return Err(aggregate(
                    ctx,
                    format!("{}: expected columns `{},<run>`", input.display(), self.key_column),
                ));
            }
            let run_name = head.get(1).unwrap_or("").to_string();
            if runs.iter().any(|(name, _)| *name == run_name) {
                return Err(aggregate(ctx, format!("duplicate run column {}", run_name)));
            }
            let mut values: IndexMap<String, String> = IndexMap::new();
            for record in reader.records() {
                let record = record.map_err(|e| aggregate(ctx, format!("{}: {}", input.display(), e)))?;
                let parameter = record.get(0).unwrap_or("").to_string();
                parameters.insert(parameter.clone());
                values.insert(parameter, record.get(1).unwrap_or("").to_string());
            }
            runs.push((run_name, values));
        }
        let mut writer =
            csv::Writer::from_path(output).map_err(|e| aggregate(ctx, format!("{}: {}", output.display(), e)))?;
        let mut head = vec!["run".to_string()];
        head.extend(parameters.iter().cloned());
        writer
            .write_record(&head)
            .map_err(|e| aggregate(ctx, format!("{}: {}", output.display(), e)))?;
        for (name, values) in runs.iter() {
            let mut row = vec![name.clone()];
            for parameter in parameters.iter() {
                row.push(values.get(parameter).cloned().unwrap_or_default());
            }
            writer
                .write_record(&row)
                .map_err(|e| aggregate(ctx, format!("{}: {}", output.display(), e)))?;
        }
        writer.flush().map_err(|e| FlowError::io(output, e))?;
        info!(
            "{}: pivoted {} runs over {} parameters into {}",
            ctx.name,
            runs.len(),
            parameters.len(),
            output.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;

    fn context(dir: &Path, inputs: &[&str], output: &str) -> TaskContext {
        TaskContext {
            name: "aggregate".to_string(),
            inputs: inputs.iter().map(|name| dir.join(name)).collect(),
            outputs: vec![dir.join(output)],
        }
    }

    #[test]
    fn test_stack() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "scenario,cost\nod,10.5\n").unwrap();
        fs::write(dir.path().join("b.csv"), "scenario,cost\nnew20,7.25\n").unwrap();
        let ctx = context(dir.path(), &["a.csv", "b.csv"], "summary.csv");
        StackCsv::new("scenario").run(&ctx).unwrap();
        let summary = fs::read_to_string(dir.path().join("summary.csv")).unwrap();
        assert_eq!(summary, "scenario,cost\nod,10.5\nnew20,7.25\n");
    }

    #[test]
    fn test_stack_duplicate_key() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "scenario,cost\nod,10.5\n").unwrap();
        fs::write(dir.path().join("b.csv"), "scenario,cost\nod,7.25\n").unwrap();
        let ctx = context(dir.path(), &["a.csv", "b.csv"], "summary.csv");
        let err = StackCsv::new("scenario").run(&ctx).unwrap_err();
        assert!(err.to_string().contains("duplicate scenario od"));
    }

    #[test]
    fn test_stack_header_mismatch() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "scenario,cost\nod,10.5\n").unwrap();
        fs::write(dir.path().join("b.csv"), "scenario,price\nnew20,7.25\n").unwrap();
        let ctx = context(dir.path(), &["a.csv", "b.csv"], "summary.csv");
        let err = StackCsv::new("scenario").run(&ctx).unwrap_err();
        assert!(err.to_string().contains("header mismatch"));
    }

    #[test]
    fn test_pivot() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "parameter,od_smooth\ncost,12.0\nqos,0.99\n").unwrap();
        fs::write(dir.path().join("b.csv"), "parameter,od_uniform\ncost,11.5\nlost,3\n").unwrap();
        let ctx = context(dir.path(), &["a.csv", "b.csv"], "summary.csv");
        PivotCsv::new("parameter").run(&ctx).unwrap();
        let summary = fs::read_to_string(dir.path().join("summary.csv")).unwrap();
        assert_eq!(
            summary,
            "run,cost,qos,lost\nod_smooth,12.0,0.99,\nod_uniform,11.5,,3\n"
        );
    }

    #[test]
    fn test_pivot_rejects_extra_columns() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.csv"), "parameter,x,y\ncost,1,2\n").unwrap();
        let ctx = context(dir.path(), &["a.csv"], "summary.csv");
        let err = PivotCsv::new("parameter").run(&ctx).unwrap_err();
        assert!(err.to_string().contains("expected columns"));
    }

    #[test]
    fn test_output_write_error_rendering() {
        let err = FlowError::io(
            Path::new("results/summary.csv"),
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        assert!(err.to_string().contains("results/summary.csv"));
        assert!(err.to_string().contains("disk full"));
    }
}
