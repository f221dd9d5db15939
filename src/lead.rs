//! The 12 standard leads and the reconstitution of the derived limb leads.
//!
//! The recorder stores III, aVR, aVL and aVF as residuals against what can be
//! computed from I and II. Reconstitution adds the computed part back. aVL
//! and aVF are computed from the reconstituted III, so III comes first.

use std::fmt;

use itertools::izip;

use crate::error::EcgError;

pub const MAX_LEADS: usize = 12;
pub const MIN_LEADS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Lead {
    I,
    II,
    III,
    AVR,
    AVL,
    AVF,
    V1,
    V2,
    V3,
    V4,
    V5,
    V6,
}

impl Lead {
    /// Canonical storage order.
    pub const ALL: [Lead; MAX_LEADS] = [
        Lead::I,
        Lead::II,
        Lead::III,
        Lead::AVR,
        Lead::AVL,
        Lead::AVF,
        Lead::V1,
        Lead::V2,
        Lead::V3,
        Lead::V4,
        Lead::V5,
        Lead::V6,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Lead::I => "I",
            Lead::II => "II",
            Lead::III => "III",
            Lead::AVR => "aVR",
            Lead::AVL => "aVL",
            Lead::AVF => "aVF",
            Lead::V1 => "V1",
            Lead::V2 => "V2",
            Lead::V3 => "V3",
            Lead::V4 => "V4",
            Lead::V5 => "V5",
            Lead::V6 => "V6",
        }
    }
}

impl fmt::Display for Lead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Between [`MIN_LEADS`] and [`MAX_LEADS`] leads in canonical order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeadSet(pub(crate) Vec<Vec<f64>>);

impl LeadSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, lead: Lead) -> Option<&[f64]> {
        self.0.get(lead.index()).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Lead, &[f64])> {
        Lead::ALL.into_iter().zip(self.0.iter().map(Vec::as_slice))
    }

    /// Apply `f` to every lead independently.
    pub fn map<F>(&self, mut f: F) -> Self
    where
        F: FnMut(Lead, &[f64]) -> Vec<f64>,
    {
        Self(self.iter().map(|(lead, samples)| f(lead, samples)).collect())
    }

    pub fn into_inner(self) -> Vec<Vec<f64>> {
        self.0
    }
}

/// The four limb leads computed from I and II plus their stored residuals.
#[derive(Debug, Clone, PartialEq)]
pub struct LimbLeads {
    pub iii: Vec<f64>,
    pub avr: Vec<f64>,
    pub avl: Vec<f64>,
    pub avf: Vec<f64>,
}

/// Reconstitute III, aVR, aVL and aVF.
///
/// Each output is as long as its stored residual; the reference leads must
/// be at least that long.
pub fn derive_limb_leads(
    i: &[f64],
    ii: &[f64],
    iii: &[f64],
    avr: &[f64],
    avl: &[f64],
    avf: &[f64],
) -> Result<LimbLeads, EcgError> {
    check_len(Lead::III, iii, &[i, ii])?;
    let iii = izip!(i, ii, iii)
        .map(|(i, ii, r)| ii - i - r)
        .collect::<Vec<_>>();

    check_len(Lead::AVR, avr, &[i, ii])?;
    let avr = izip!(i, ii, avr)
        .map(|(i, ii, r)| -r - (i + ii) / 2.0)
        .collect();

    check_len(Lead::AVL, avl, &[i, iii.as_slice()])?;
    let avl = izip!(i, &iii, avl)
        .map(|(i, iii, r)| (i - iii) / 2.0 - r)
        .collect();

    check_len(Lead::AVF, avf, &[ii, iii.as_slice()])?;
    let avf = izip!(ii, &iii, avf)
        .map(|(ii, iii, r)| (ii + iii) / 2.0 - r)
        .collect();

    Ok(LimbLeads { iii, avr, avl, avf })
}

fn check_len(lead: Lead, samples: &[f64], references: &[&[f64]]) -> Result<(), EcgError> {
    let expected = references.iter().map(|r| r.len()).min().unwrap_or(0);
    if samples.len() > expected {
        return Err(EcgError::LeadLengthMismatch {
            lead,
            expected,
            found: samples.len(),
        });
    }
    Ok(())
}

/// Build a [`LeadSet`] from decoded chunks in storage order.
///
/// Chunks past the 12th are ignored. I, II and V1-V6 pass through.
pub fn reconstitute<S: AsRef<[i32]>>(chunks: &[S]) -> Result<LeadSet, EcgError> {
    if chunks.len() < MIN_LEADS {
        return Err(EcgError::InsufficientLeads {
            found: chunks.len(),
        });
    }
    let mut leads = chunks
        .iter()
        .take(MAX_LEADS)
        .map(|c| c.as_ref().iter().map(|&v| v as f64).collect::<Vec<_>>())
        .collect::<Vec<_>>();

    let limb = derive_limb_leads(
        &leads[Lead::I.index()],
        &leads[Lead::II.index()],
        &leads[Lead::III.index()],
        &leads[Lead::AVR.index()],
        &leads[Lead::AVL.index()],
        &leads[Lead::AVF.index()],
    )?;
    leads[Lead::III.index()] = limb.iii;
    leads[Lead::AVR.index()] = limb.avr;
    leads[Lead::AVL.index()] = limb.avl;
    leads[Lead::AVF.index()] = limb.avf;

    Ok(LeadSet(leads))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_zero_leads_stay_zero() -> eyre::Result<()> {
        let chunks = vec![vec![0i32; 16]; MAX_LEADS];
        let leads = reconstitute(&chunks)?;
        for lead in [Lead::III, Lead::AVR, Lead::AVL, Lead::AVF] {
            assert!(leads.get(lead).unwrap().iter().all(|&v| v == 0.0));
        }
        Ok(())
    }

    #[test]
    fn test_derivation_order() -> eyre::Result<()> {
        let i = [4.0];
        let ii = [10.0];
        let limb = derive_limb_leads(&i, &ii, &[1.0], &[2.0], &[3.0], &[1.5])?;
        // III = 10 - 4 - 1
        assert_eq!(limb.iii, [5.0]);
        // aVR = -2 - 14 / 2
        assert_eq!(limb.avr, [-9.0]);
        // aVL = (4 - 5) / 2 - 3, using the reconstituted III
        assert_eq!(limb.avl, [-3.5]);
        // aVF = (10 + 5) / 2 - 1.5
        assert_eq!(limb.avf, [6.0]);
        Ok(())
    }

    #[test]
    fn test_halves_are_not_truncated() -> eyre::Result<()> {
        let limb = derive_limb_leads(&[1.0], &[2.0], &[0.0], &[0.0], &[0.0], &[0.0])?;
        assert_eq!(limb.avr, [-1.5]);
        Ok(())
    }

    #[test]
    fn test_passthrough_leads() -> eyre::Result<()> {
        let chunks = (0..MAX_LEADS as i32)
            .map(|n| vec![n, n + 1, n + 2])
            .collect::<Vec<_>>();
        let leads = reconstitute(&chunks)?;
        assert_eq!(leads.len(), MAX_LEADS);
        assert_eq!(leads.get(Lead::I).unwrap(), [0.0, 1.0, 2.0]);
        assert_eq!(leads.get(Lead::II).unwrap(), [1.0, 2.0, 3.0]);
        assert_eq!(leads.get(Lead::V1).unwrap(), [6.0, 7.0, 8.0]);
        assert_eq!(leads.get(Lead::V6).unwrap(), [11.0, 12.0, 13.0]);
        Ok(())
    }

    #[test]
    fn test_extra_chunks_dropped() -> eyre::Result<()> {
        let chunks = vec![vec![1i32, 2]; 15];
        assert_eq!(reconstitute(&chunks)?.len(), MAX_LEADS);
        Ok(())
    }

    #[test]
    fn test_partial_set() -> eyre::Result<()> {
        let chunks = vec![vec![1i32, 2]; MIN_LEADS];
        let leads = reconstitute(&chunks)?;
        assert_eq!(leads.len(), MIN_LEADS);
        assert!(leads.get(Lead::V1).is_none());
        Ok(())
    }

    #[test]
    fn test_insufficient_leads() {
        let chunks = vec![vec![1i32, 2]; 5];
        assert!(matches!(
            reconstitute(&chunks),
            Err(EcgError::InsufficientLeads { found: 5 })
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let mut chunks = vec![vec![0i32; 4]; MAX_LEADS];
        chunks[Lead::AVL.index()].push(0);
        assert!(matches!(
            reconstitute(&chunks),
            Err(EcgError::LeadLengthMismatch {
                lead: Lead::AVL,
                expected: 4,
                found: 5
            })
        ));
    }

    #[test]
    fn test_names() {
        let names = Lead::ALL.iter().map(|l| l.to_string()).collect::<Vec<_>>();
        assert_eq!(
            names,
            ["I", "II", "III", "aVR", "aVL", "aVF", "V1", "V2", "V3", "V4", "V5", "V6"]
        );
        assert_eq!(Lead::from_index(5), Some(Lead::AVF));
        assert_eq!(Lead::from_index(12), None);
    }
}
