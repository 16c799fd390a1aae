//! Resource vectors and the per-resource window table.

use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::ops::{Deref, DerefMut};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::{EspprcError, Result};
use crate::NodeId;

/// Fixed-shape numeric value of a single resource.
///
/// The length is set on construction and can never change: the buffer is a boxed
/// slice and mutable access only hands out `&mut [f64]`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceVector(Box<[f64]>);

impl ResourceVector {
    /// One-element vector, used for time, load and reduced cost
    pub fn scalar(value : f64) -> Self {
        Self(Box::new([value]))
    }

    /// Vector of `len` zeros
    pub fn zeros(len : usize) -> Self {
        Self(vec![0.0; len].into_boxed_slice())
    }

    pub fn is_scalar(&self) -> bool {
        self.0.len() == 1
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl Deref for ResourceVector {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl DerefMut for ResourceVector {
    fn deref_mut(&mut self) -> &mut [f64] {
        &mut self.0
    }
}

impl From<Vec<f64>> for ResourceVector {
    fn from(values : Vec<f64>) -> Self {
        Self(values.into_boxed_slice())
    }
}

impl From<&[f64]> for ResourceVector {
    fn from(values : &[f64]) -> Self {
        Self(values.into())
    }
}

impl FromIterator<f64> for ResourceVector {
    fn from_iter<I : IntoIterator<Item = f64>>(iter : I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Debug for ResourceVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl Display for ResourceVector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

/// Admissible range of one resource.
///
/// A window of length one is global and broadcasts over every element and every
/// node; longer windows hold one bound pair per graph node.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceWindow {
    lower : ResourceVector,
    upper : ResourceVector,
}

impl ResourceWindow {
    fn new(resource : &str, lower : Vec<f64>, upper : Vec<f64>) -> Result<Self> {
        if lower.is_empty() || lower.len() != upper.len() {
            return Err(EspprcError::WindowShape {
                resource : resource.to_owned(),
                lower_len : lower.len(),
                upper_len : upper.len(),
            });
        }
        for (index, (&lo, &up)) in lower.iter().zip(&upper).enumerate() {
            if lo.is_nan() || up.is_nan() || lo > up {
                return Err(EspprcError::InvalidWindow {
                    resource : resource.to_owned(),
                    index,
                    lower : lo,
                    upper : up,
                });
            }
        }
        Ok(Self {
            lower : lower.into(),
            upper : upper.into(),
        })
    }

    pub fn lower(&self) -> &ResourceVector {
        &self.lower
    }

    pub fn upper(&self) -> &ResourceVector {
        &self.upper
    }

    pub fn len(&self) -> usize {
        self.lower.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lower.is_empty()
    }

    /// Single global bound pair
    pub fn is_scalar(&self) -> bool {
        self.lower.is_scalar()
    }

    /// Bound pair that applies at `index`, broadcasting scalar windows.
    /// Returns `None` when a node-indexed window is too short.
    pub fn bounds_at(&self, index : usize) -> Option<(f64, f64)> {
        if self.is_scalar() {
            return Some((self.lower[0], self.upper[0]));
        }
        Some((*self.lower.get(index)?, *self.upper.get(index)?))
    }

    /// Checks that `node` is a valid index into a node-indexed window.
    pub(crate) fn check_node(&self, resource : &str, node : NodeId) -> Result<()> {
        if self.is_scalar() || node < self.len() {
            Ok(())
        } else {
            Err(EspprcError::NodeOutOfRange {
                resource : resource.to_owned(),
                node,
                len : self.len(),
            })
        }
    }
}

/// Lower/upper bounds for every resource, keyed by resource name.
///
/// Invalid windows are rejected on insertion, so every window held here satisfies
/// `lower[i] <= upper[i]`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, RawWindow>", into = "BTreeMap<String, RawWindow>")]
pub struct WindowTable {
    windows : BTreeMap<String, ResourceWindow>,
}

/// `(lower, upper)` as written in configuration files, `null` meaning unbounded.
type RawWindow = (Vec<Option<f64>>, Vec<Option<f64>>);

impl WindowTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the window of `resource`.
    pub fn insert(&mut self, resource : impl Into<String>, lower : Vec<f64>, upper : Vec<f64>) -> Result<()> {
        let resource = resource.into();
        let window = ResourceWindow::new(&resource, lower, upper)?;
        self.windows.insert(resource, window);
        Ok(())
    }

    /// Builder flavour of [`WindowTable::insert`]
    pub fn with(mut self, resource : impl Into<String>, lower : Vec<f64>, upper : Vec<f64>) -> Result<Self> {
        self.insert(resource, lower, upper)?;
        Ok(self)
    }

    /// Window of `resource`; a missing entry is a configuration error.
    pub fn get(&self, resource : &str) -> Result<&ResourceWindow> {
        self.windows.get(resource).ok_or_else(|| EspprcError::MissingWindow {
            resource : resource.to_owned(),
        })
    }

    pub fn contains(&self, resource : &str) -> bool {
        self.windows.contains_key(resource)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceWindow)> {
        self.windows.iter().map(|(name, window)| (name.as_str(), window))
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl TryFrom<BTreeMap<String, RawWindow>> for WindowTable {
    type Error = EspprcError;

    fn try_from(raw : BTreeMap<String, RawWindow>) -> Result<Self> {
        let mut table = WindowTable::new();
        for (resource, (lower, upper)) in raw {
            let lower = lower.into_iter().map(|b| b.unwrap_or(f64::NEG_INFINITY)).collect();
            let upper = upper.into_iter().map(|b| b.unwrap_or(f64::INFINITY)).collect();
            table.insert(resource, lower, upper)?;
        }
        Ok(table)
    }
}

impl From<WindowTable> for BTreeMap<String, RawWindow> {
    fn from(table : WindowTable) -> Self {
        let finite = |v : &f64| if v.is_finite() { Some(*v) } else { None };
        table
            .windows
            .into_iter()
            .map(|(resource, window)| {
                let lower = window.lower.iter().map(finite).collect();
                let upper = window.upper.iter().map(finite).collect();
                (resource, (lower, upper))
            })
            .collect()
    }
}
