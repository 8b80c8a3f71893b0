use std::{ops::Range, ops::RangeInclusive, rc::Rc};

use crate::errors::{RastioError, Result};

/// Band selection for dataset reads. Band indexes start at 1.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub enum Indexes {
    All,
    Selection(Rc<[usize]>),
}

impl Indexes {
    pub fn all() -> Self {
        Indexes::All
    }

    /// Concrete 1-based indexes against a dataset with `count` bands,
    /// in selection order.
    pub fn resolve(&self, count: usize) -> Result<Rc<[usize]>> {
        match self {
            Indexes::All => Ok((1..=count).collect()),
            Indexes::Selection(selection) => {
                for &index in selection.iter() {
                    if index == 0 || index > count {
                        return Err(RastioError::BandIndexOutOfRange { index, count });
                    }
                }
                Ok(Rc::clone(selection))
            }
        }
    }
}

impl From<usize> for Indexes {
    fn from(index: usize) -> Self {
        Indexes::Selection(Rc::from([index]))
    }
}

impl<const N: usize> From<[usize; N]> for Indexes {
    fn from(selection: [usize; N]) -> Self {
        Indexes::Selection(Rc::from(selection))
    }
}

impl From<&[usize]> for Indexes {
    fn from(selection: &[usize]) -> Self {
        Indexes::Selection(Rc::from(selection))
    }
}

impl From<Vec<usize>> for Indexes {
    fn from(selection: Vec<usize>) -> Self {
        Indexes::Selection(Rc::from(selection))
    }
}

impl From<Range<usize>> for Indexes {
    fn from(range: Range<usize>) -> Self {
        Indexes::Selection(range.collect())
    }
}

impl From<RangeInclusive<usize>> for Indexes {
    fn from(range: RangeInclusive<usize>) -> Self {
        Indexes::Selection(range.collect())
    }
}
