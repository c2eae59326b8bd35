// Spectral module - in-place FFT magnitude computation
//
// The sample window is copied into the real half of a paired real/imaginary
// buffer, transformed with a forward FFT and reduced to magnitudes in place.
// Direction convention: kernel e^{-2πikn/N}, i.e. the NumPy forward transform
// (the device FFT library calls this direction "Reverse"). No window
// function and no normalisation are applied.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use crate::error::AnalysisError;

/// Paired real/imaginary scratch buffers of the transform length
///
/// After `complex_to_magnitude` the real half holds magnitudes and the
/// imaginary half is zero.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralBuffers {
    pub real: Vec<f32>,
    pub imag: Vec<f32>,
}

impl SpectralBuffers {
    pub fn new(len: usize) -> Self {
        Self {
            real: vec![0.0; len],
            imag: vec![0.0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.real.len()
    }

    pub fn is_empty(&self) -> bool {
        self.real.is_empty()
    }

    /// Zero both halves
    pub fn clear(&mut self) {
        self.real.fill(0.0);
        self.imag.fill(0.0);
    }

    pub fn is_zeroed(&self) -> bool {
        self.real.iter().chain(self.imag.iter()).all(|&v| v == 0.0)
    }
}

/// Forward FFT planned once for a fixed length
pub struct SpectralTransform {
    fft: Arc<dyn Fft<f32>>,
    len: usize,
    workspace: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
}

impl SpectralTransform {
    /// Plan a forward transform of `len` points
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(len);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Self {
            fft,
            len,
            workspace: vec![Complex::new(0.0, 0.0); len],
            scratch,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Copy the first `len` window samples into the real half, zero the
    /// imaginary half
    pub fn load(&self, window: &[i16], buffers: &mut SpectralBuffers) -> Result<(), AnalysisError> {
        self.check_len(buffers)?;
        if window.len() < self.len {
            return Err(AnalysisError::LengthMismatch {
                expected: self.len,
                actual: window.len(),
            });
        }

        for (dst, &sample) in buffers.real.iter_mut().zip(window) {
            *dst = sample as f32;
        }
        buffers.imag.fill(0.0);
        Ok(())
    }

    /// Complex forward DFT of `real + j·imag`, result written back in place
    pub fn forward(&mut self, buffers: &mut SpectralBuffers) -> Result<(), AnalysisError> {
        self.check_len(buffers)?;

        for ((slot, &re), &im) in self
            .workspace
            .iter_mut()
            .zip(&buffers.real)
            .zip(&buffers.imag)
        {
            *slot = Complex::new(re, im);
        }

        self.fft
            .process_with_scratch(&mut self.workspace, &mut self.scratch);

        for ((re, im), value) in buffers
            .real
            .iter_mut()
            .zip(buffers.imag.iter_mut())
            .zip(&self.workspace)
        {
            *re = value.re;
            *im = value.im;
        }
        Ok(())
    }

    /// Replace each complex bin with its magnitude; imaginary half is
    /// discarded
    pub fn complex_to_magnitude(buffers: &mut SpectralBuffers) {
        for (re, im) in buffers.real.iter_mut().zip(buffers.imag.iter_mut()) {
            *re = Complex::new(*re, *im).norm();
            *im = 0.0;
        }
    }

    /// load + forward + magnitude
    pub fn compute_magnitudes(
        &mut self,
        window: &[i16],
        buffers: &mut SpectralBuffers,
    ) -> Result<(), AnalysisError> {
        self.load(window, buffers)?;
        self.forward(buffers)?;
        Self::complex_to_magnitude(buffers);
        Ok(())
    }

    fn check_len(&self, buffers: &SpectralBuffers) -> Result<(), AnalysisError> {
        if buffers.real.len() != self.len || buffers.imag.len() != self.len {
            return Err(AnalysisError::LengthMismatch {
                expected: self.len,
                actual: buffers.real.len().min(buffers.imag.len()),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (i, (a, e)) in actual.iter().zip(expected).enumerate() {
            assert!((a - e).abs() < 1e-4, "bin {}: got {}, expected {}", i, a, e);
        }
    }

    #[test]
    fn test_forward_matches_numpy_convention() {
        // numpy.fft.fft([1, 2, 3, 4]) == [10, -2+2j, -2, -2-2j]
        let mut transform = SpectralTransform::new(4);
        let mut buffers = SpectralBuffers::new(4);
        transform.load(&[1, 2, 3, 4], &mut buffers).unwrap();
        transform.forward(&mut buffers).unwrap();

        assert_close(&buffers.real, &[10.0, -2.0, -2.0, -2.0]);
        assert_close(&buffers.imag, &[0.0, 2.0, 0.0, -2.0]);
    }

    #[test]
    fn test_magnitude_of_reference_signal() {
        let mut transform = SpectralTransform::new(4);
        let mut buffers = SpectralBuffers::new(4);
        transform
            .compute_magnitudes(&[1, 2, 3, 4], &mut buffers)
            .unwrap();

        let root8 = 8.0f32.sqrt();
        assert_close(&buffers.real, &[10.0, root8, 2.0, root8]);
        assert!(buffers.imag.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_zero_window_gives_zero_magnitudes() {
        let mut transform = SpectralTransform::new(1024);
        let mut buffers = SpectralBuffers::new(1024);
        transform
            .compute_magnitudes(&vec![0i16; 1024], &mut buffers)
            .unwrap();
        assert!(buffers.is_zeroed());
    }

    #[test]
    fn test_sine_peaks_at_its_bin() {
        let n = 256;
        let bin = 16;
        let window: Vec<i16> = (0..n)
            .map(|i| (1000.0 * (2.0 * PI * bin as f32 * i as f32 / n as f32).sin()) as i16)
            .collect();

        let mut transform = SpectralTransform::new(n);
        let mut buffers = SpectralBuffers::new(n);
        transform.compute_magnitudes(&window, &mut buffers).unwrap();

        let peak = buffers
            .real
            .iter()
            .take(n / 2)
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, bin);
        // Real input: mirrored peak
        assert!((buffers.real[n - bin] - buffers.real[bin]).abs() < 1.0);
    }

    #[test]
    fn test_uses_leading_samples_of_longer_window() {
        let mut transform = SpectralTransform::new(4);
        let mut buffers = SpectralBuffers::new(4);
        transform.load(&[1, 2, 3, 4, 99, 99], &mut buffers).unwrap();
        assert_eq!(buffers.real, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let mut transform = SpectralTransform::new(8);
        let mut buffers = SpectralBuffers::new(4);
        assert_eq!(
            transform.forward(&mut buffers),
            Err(AnalysisError::LengthMismatch {
                expected: 8,
                actual: 4
            })
        );

        let mut buffers = SpectralBuffers::new(8);
        assert!(matches!(
            transform.load(&[1, 2, 3], &mut buffers),
            Err(AnalysisError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_clear_zeroes_both_halves() {
        let mut buffers = SpectralBuffers::new(3);
        buffers.real[1] = 4.0;
        buffers.imag[2] = -1.0;
        assert!(!buffers.is_zeroed());
        buffers.clear();
        assert!(buffers.is_zeroed());
        assert_eq!(buffers.len(), 3);
    }
}
