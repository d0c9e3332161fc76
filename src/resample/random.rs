//! Random oversampling (duplicates minority samples).

use rand::rngs::StdRng;
use rand::Rng;

use super::{class_indices, deficits, Oversampler, Resampled, SamplingError};

/// Brings each class up to the majority size by duplicating randomly chosen rows of that class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomOverSampler;

impl Oversampler for RandomOverSampler {
    fn resample(
        &self,
        features: &[Vec<f64>],
        labels: &[usize],
        rng: &mut StdRng,
    ) -> Result<Resampled, SamplingError> {
        let indices = class_indices(labels);
        let needed = deficits(&indices)?;

        let mut out_x = features.to_vec();
        let mut out_y = labels.to_vec();
        let mut n_synthetic = vec![0; indices.len()];

        for (class, rows) in indices.iter().enumerate() {
            if rows.is_empty() {
                continue;
            }
            for _ in 0..needed[class] {
                let pick = rows[rng.gen_range(0..rows.len())];
                out_x.push(features[pick].clone());
                out_y.push(class);
            }
            n_synthetic[class] = needed[class];
        }

        Ok(Resampled {
            features: out_x,
            labels: out_y,
            n_synthetic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::RandomOverSampler;
    use crate::resample::{Oversampler, SamplingError};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn duplicates_existing_minority_rows() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![9.0]];
        let y = vec![0, 0, 0, 1];
        let mut rng = StdRng::seed_from_u64(3);
        let out = RandomOverSampler.resample(&x, &y, &mut rng).unwrap();
        assert_eq!(out.features.len(), 6);
        assert_eq!(out.n_synthetic, vec![0, 2]);
        assert_eq!(&out.features[4..], &[vec![9.0], vec![9.0]]);
        assert_eq!(&out.labels[4..], &[1, 1]);
    }

    #[test]
    fn single_class_is_rejected() {
        let mut rng = StdRng::seed_from_u64(3);
        let err = RandomOverSampler
            .resample(&[vec![0.0], vec![1.0]], &[0, 0], &mut rng)
            .unwrap_err();
        assert_eq!(err, SamplingError::TooFewClasses { found: 1 });
    }
}
