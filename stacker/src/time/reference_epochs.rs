//! Reference epochs used to bin cyan-band observations.
//!
//! A reference epoch set is an ordered list of anchor timestamps (typically
//! new-moon dates). Each cyan epoch is attached to the anchor nearest to it.
//! The set is built once per run and only read afterwards, so one instance
//! can be shared across worker threads.

/// Sorted, immutable set of reference timestamps (MJD).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferenceEpochs {
    epochs: Vec<f64>,
}

impl ReferenceEpochs {
    /// Build a reference set, dropping non-finite values and sorting ascending.
    ///
    /// # Examples
    ///
    /// ```
    /// use atlas_stacker::time::ReferenceEpochs;
    ///
    /// let refs = ReferenceEpochs::new(vec![58420.0, f64::NAN, 58400.0]);
    /// assert_eq!(refs.as_slice(), &[58400.0, 58420.0]);
    /// ```
    pub fn new(mut epochs: Vec<f64>) -> Self {
        epochs.retain(|e| e.is_finite());
        epochs.sort_by(f64::total_cmp);
        Self { epochs }
    }

    pub fn len(&self) -> usize {
        self.epochs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.epochs.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.epochs
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.epochs.get(index).copied()
    }

    /// Index of the reference epoch nearest to `mjd`.
    ///
    /// Ties go to the first minimal element in ascending order, i.e. the
    /// earlier reference epoch. Returns `None` for an empty set or a
    /// non-finite `mjd`.
    ///
    /// # Examples
    ///
    /// ```
    /// use atlas_stacker::time::ReferenceEpochs;
    ///
    /// let refs = ReferenceEpochs::new(vec![58400.0, 58420.0]);
    /// assert_eq!(refs.nearest_index(58415.0), Some(1));
    /// assert_eq!(refs.nearest_index(58410.0), Some(0));
    /// ```
    pub fn nearest_index(&self, mjd: f64) -> Option<usize> {
        if !mjd.is_finite() {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        for (i, &epoch) in self.epochs.iter().enumerate() {
            let distance = (mjd - epoch).abs();
            match best {
                Some((_, d)) if distance >= d => {}
                _ => best = Some((i, distance)),
            }
        }
        best.map(|(i, _)| i)
    }

    /// Reference epoch nearest to `mjd`.
    pub fn nearest(&self, mjd: f64) -> Option<f64> {
        self.nearest_index(mjd).and_then(|i| self.get(i))
    }
}

impl From<Vec<f64>> for ReferenceEpochs {
    fn from(epochs: Vec<f64>) -> Self {
        Self::new(epochs)
    }
}
