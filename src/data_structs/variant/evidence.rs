use std::fmt::Display;
use std::sync::Arc;

use anyhow::anyhow;
use arcstr::ArcStr;
use hashbrown::HashMap;
use itertools::Itertools;
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    getter_fn,
    with_field_fn,
};

/// A typed value of a VCF INFO field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InfoValue {
    Flag,
    Integer(i64),
    Float(f64),
    String(ArcStr),
    IntegerArray(Vec<i64>),
    FloatArray(Vec<f64>),
    StringArray(Vec<ArcStr>),
}

impl InfoValue {
    /// Numeric value of the field. Array values are indexed by `index`,
    /// which is the alternate allele index for per-allele fields.
    pub fn as_f64(
        &self,
        index: usize,
    ) -> anyhow::Result<f64> {
        match self {
            InfoValue::Integer(v) => Ok(*v as f64),
            InfoValue::Float(v) => Ok(*v),
            InfoValue::IntegerArray(values) => values
                .get(index)
                .map(|v| *v as f64)
                .ok_or_else(|| {
                    anyhow!(
                        "index {} out of bounds for array of {}",
                        index,
                        values.len()
                    )
                }),
            InfoValue::FloatArray(values) => values
                .get(index)
                .copied()
                .ok_or_else(|| {
                    anyhow!(
                        "index {} out of bounds for array of {}",
                        index,
                        values.len()
                    )
                }),
            other => Err(anyhow!("value {} is not numeric", other)),
        }
    }

    /// String values of the field. Scalars yield a single element.
    pub fn as_strings(&self) -> Vec<ArcStr> {
        match self {
            InfoValue::Flag => Vec::new(),
            InfoValue::String(s) => vec![s.clone()],
            InfoValue::StringArray(values) => values.clone(),
            InfoValue::Integer(v) => vec![ArcStr::from(v.to_string())],
            InfoValue::Float(v) => vec![ArcStr::from(v.to_string())],
            InfoValue::IntegerArray(values) => values
                .iter()
                .map(|v| ArcStr::from(v.to_string()))
                .collect(),
            InfoValue::FloatArray(values) => values
                .iter()
                .map(|v| ArcStr::from(v.to_string()))
                .collect(),
        }
    }
}

impl Display for InfoValue {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            InfoValue::Flag => write!(f, "<flag>"),
            InfoValue::Integer(v) => write!(f, "{}", v),
            InfoValue::Float(v) => write!(f, "{}", v),
            InfoValue::String(v) => write!(f, "{}", v),
            InfoValue::IntegerArray(v) => write!(f, "{}", v.iter().join(",")),
            InfoValue::FloatArray(v) => write!(f, "{}", v.iter().join(",")),
            InfoValue::StringArray(v) => write!(f, "{}", v.iter().join(",")),
        }
    }
}

/// Parsed INFO block of a VCF record. One block is shared by every
/// alternate allele of the record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfoData {
    fields: HashMap<ArcStr, InfoValue>,
}

impl InfoData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(
        mut self,
        name: impl Into<ArcStr>,
        value: InfoValue,
    ) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn get(
        &self,
        name: &str,
    ) -> Option<&InfoValue> {
        self.fields.get(name)
    }

    pub fn contains(
        &self,
        name: &str,
    ) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in sorted order.
    pub fn field_names(&self) -> Vec<ArcStr> {
        self.fields.keys().cloned().sorted().collect()
    }
}

/// Evidence recorded for a variant call by the ingestion layer.
#[derive(Debug, Clone)]
pub struct VariantEvidence {
    vcf_record:       Option<u64>,
    alternate_index:  usize,
    alternate_count:  usize,
    pass:             bool,
    quality:          Option<f64>,
    ref_depth:        Option<u32>,
    alt_depth:        Option<u32>,
    total_depth:      Option<u32>,
    genotype_quality: Option<f64>,
    info:             Option<Arc<InfoData>>,
}

impl Default for VariantEvidence {
    fn default() -> Self {
        Self {
            vcf_record:       None,
            alternate_index:  0,
            alternate_count:  1,
            pass:             true,
            quality:          None,
            ref_depth:        None,
            alt_depth:        None,
            total_depth:      None,
            genotype_quality: None,
            info:             None,
        }
    }
}

impl VariantEvidence {
    pub fn new() -> Self {
        Self::default()
    }

    with_field_fn!(vcf_record, Option<u64>);
    with_field_fn!(alternate_index, usize);
    with_field_fn!(alternate_count, usize);
    with_field_fn!(pass, bool);
    with_field_fn!(quality, Option<f64>);
    with_field_fn!(ref_depth, Option<u32>);
    with_field_fn!(alt_depth, Option<u32>);
    with_field_fn!(total_depth, Option<u32>);
    with_field_fn!(genotype_quality, Option<f64>);
    with_field_fn!(info, Option<Arc<InfoData>>);

    getter_fn!(vcf_record, Option<u64>);
    getter_fn!(quality, Option<f64>);
    getter_fn!(ref_depth, Option<u32>);
    getter_fn!(alt_depth, Option<u32>);
    getter_fn!(genotype_quality, Option<f64>);
    getter_fn!(info, Option<Arc<InfoData>>);

    pub fn alternate_index(&self) -> usize {
        self.alternate_index
    }

    pub fn alternate_count(&self) -> usize {
        self.alternate_count
    }

    pub fn pass(&self) -> bool {
        self.pass
    }

    /// Total read depth, falling back to `ref_depth + alt_depth` when the
    /// caller did not record it. `None` if that sum overflows.
    pub fn total_depth(&self) -> Option<u32> {
        self.total_depth.or(match (self.ref_depth, self.alt_depth) {
            (Some(r), Some(a)) => r.checked_add(a),
            _ => None,
        })
    }

    /// Numeric INFO field for this variant's alternate allele.
    pub fn info_numeric(
        &self,
        field: &str,
    ) -> anyhow::Result<f64> {
        let info = self
            .info
            .as_ref()
            .ok_or_else(|| anyhow!("variant has no INFO block"))?;
        let value = info
            .get(field)
            .ok_or_else(|| anyhow!("INFO field '{}' not present", field))?;
        value.as_f64(self.alternate_index)
    }

    pub fn info_value(
        &self,
        field: &str,
    ) -> Option<&InfoValue> {
        self.info.as_ref().and_then(|info| info.get(field))
    }

    /// Copy with a freshly allocated INFO block.
    pub fn deep_clone(&self) -> Self {
        Self {
            info: self
                .info
                .as_ref()
                .map(|info| Arc::new(InfoData::clone(info))),
            ..self.clone()
        }
    }
}
