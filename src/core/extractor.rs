// src/core/extractor.rs
use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use super::aliases::AliasExtractor;
use super::discoverer::{Discovery, FieldDeclaration, FieldDiscoverer};
use super::record::{AttributeRecord, ExtractedRecord, RecordAssembler};
use super::scanner::ReferenceScanner;
use super::snapshot::{FileKind, ProjectSnapshot, SourceFile};

/// Runs discovery, alias extraction, reference scanning and assembly over a
/// snapshot. A pure function of the snapshot plus batch metadata.
pub struct AttributeExtractor<'a> {
    snapshot: &'a ProjectSnapshot,
    assembler: RecordAssembler,
    emit_class_records: bool,
}

impl<'a> AttributeExtractor<'a> {
    pub fn new(snapshot: &'a ProjectSnapshot, assembler: RecordAssembler) -> Self {
        Self {
            snapshot,
            assembler,
            emit_class_records: false,
        }
    }

    pub fn with_class_records(mut self, enabled: bool) -> Self {
        self.emit_class_records = enabled;
        self
    }

    /// Records for every source file, in snapshot order
    pub fn extract_all(&self) -> Result<Vec<ExtractedRecord>> {
        let per_file: Vec<Vec<ExtractedRecord>> = self.snapshot.files()
            .par_iter()
            .filter(|file| file.kind == FileKind::Source)
            .map(|file| self.extract_file(file))
            .collect::<Result<_>>()?;

        Ok(per_file.into_iter().flatten().collect())
    }

    pub fn extract_file(&self, file: &SourceFile) -> Result<Vec<ExtractedRecord>> {
        let discovery = FieldDiscoverer::discover(file);
        debug!("{} [{}]: class {}", file.relative_path, self.assembler.batch_id(), discovery.class_name());

        match discovery {
            Discovery::Fields { fields, .. } => {
                debug!("{}: {} field(s)", file.relative_path, fields.len());
                fields.par_iter()
                    .map(|field| {
                        self.extract_field(file, field)
                            .map(|record| ExtractedRecord::Attribute(Box::new(record)))
                    })
                    .collect()
            }
            Discovery::ClassOnly { class_name } => {
                if self.emit_class_records {
                    Ok(vec![ExtractedRecord::Class(
                        self.assembler.assemble_class(&class_name, &file.relative_path, &file.content),
                    )])
                } else {
                    debug!("{}: no fields in {}", file.relative_path, class_name);
                    Ok(Vec::new())
                }
            }
        }
    }

    pub fn extract_field(&self, file: &SourceFile, field: &FieldDeclaration) -> Result<AttributeRecord> {
        let lines = file.lines();
        let aliases = AliasExtractor::extract(&field.name, field.line_index(), &lines)?;
        let references = ReferenceScanner::new(self.snapshot)
            .scan(&field.name, &field.file_path, &field.declaration)?;

        debug!(
            "{}.{}: {} alias(es), {} raw occurrence(s)",
            field.class_name, field.name, aliases.len(), references.len()
        );

        Ok(self.assembler.assemble(field, file.layer, aliases, references, &file.content))
    }
}
