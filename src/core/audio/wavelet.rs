//! Periodized Daubechies-4 wavelet transform used by the denoiser.
//!
//! The decomposition keeps enough bookkeeping (pre-pad length per level) for
//! `waverec` to reproduce the input length exactly, including odd-length
//! blocks. Callers only threshold detail bands; the approximation band is
//! never touched.

/// Daubechies-4 scaling filter, orthonormal (sum of squares = 1).
const DB4_LO: [f64; 8] = [
    0.230_377_813_308_855_23,
    0.714_846_570_552_541_5,
    0.630_880_767_929_590_4,
    -0.027_983_769_416_983_85,
    -0.187_034_811_718_881_14,
    0.030_841_381_835_986_965,
    0.032_883_011_666_982_945,
    -0.010_597_401_784_997_278,
];

const FILTER_LEN: usize = 8;

fn wavelet_hi() -> [f64; FILTER_LEN] {
    let mut hi = [0.0; FILTER_LEN];
    for (i, h) in hi.iter_mut().enumerate() {
        let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
        *h = sign * DB4_LO[FILTER_LEN - 1 - i];
    }
    hi
}

/// Multilevel decomposition result. Detail bands are stored finest first.
#[derive(Debug, Clone)]
pub struct WaveletBands {
    approx: Vec<f64>,
    details: Vec<Vec<f64>>,
    lengths: Vec<usize>,
}

impl WaveletBands {
    pub fn levels(&self) -> usize {
        self.details.len()
    }

    pub fn approx(&self) -> &[f64] {
        &self.approx
    }

    /// The finest-resolution detail band, if any level was produced.
    pub fn finest_detail(&self) -> Option<&[f64]> {
        self.details.first().map(|band| band.as_slice())
    }

    pub fn details_mut(&mut self) -> &mut [Vec<f64>] {
        &mut self.details
    }
}

/// One analysis step on an even-length signal: correlation with the scaling
/// and wavelet filters, downsampled by two, indices wrapped periodically.
fn analyze(signal: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let hi = wavelet_hi();
    let n = signal.len();
    let half = n / 2;
    let mut approx = vec![0.0; half];
    let mut detail = vec![0.0; half];

    for k in 0..half {
        let mut a = 0.0;
        let mut d = 0.0;
        for i in 0..FILTER_LEN {
            let x = signal[(2 * k + i) % n];
            a += DB4_LO[i] * x;
            d += hi[i] * x;
        }
        approx[k] = a;
        detail[k] = d;
    }

    (approx, detail)
}

/// Adjoint of `analyze`; exact inverse for orthonormal filters.
fn synthesize(approx: &[f64], detail: &[f64]) -> Vec<f64> {
    let hi = wavelet_hi();
    let n = approx.len() * 2;
    let mut signal = vec![0.0; n];

    for k in 0..approx.len() {
        for i in 0..FILTER_LEN {
            signal[(2 * k + i) % n] += DB4_LO[i] * approx[k] + hi[i] * detail[k];
        }
    }

    signal
}

/// Forward decomposition of `signal` over up to `max_levels` levels.
///
/// A level is only taken while the running signal holds at least one full
/// filter support, so short blocks simply produce fewer levels (possibly
/// zero, in which case the approximation band is the signal itself).
pub fn wavedec(signal: &[f64], max_levels: usize) -> WaveletBands {
    let mut current = signal.to_vec();
    let mut details = Vec::new();
    let mut lengths = Vec::new();

    for _ in 0..max_levels {
        if current.len() < FILTER_LEN {
            break;
        }
        lengths.push(current.len());
        if current.len() % 2 == 1 {
            // periodization pad; trimmed again on reconstruction
            let last = current[current.len() - 1];
            current.push(last);
        }
        let (approx, detail) = analyze(&current);
        details.push(detail);
        current = approx;
    }

    WaveletBands {
        approx: current,
        details,
        lengths,
    }
}

/// Inverse of [`wavedec`]. Output length always equals the original input
/// length.
pub fn waverec(bands: &WaveletBands) -> Vec<f64> {
    let mut current = bands.approx.clone();

    for (detail, &orig_len) in bands.details.iter().rev().zip(bands.lengths.iter().rev()) {
        let mut signal = synthesize(&current, detail);
        signal.truncate(orig_len);
        current = signal;
    }

    current
}

/// Soft-thresholding: shrink every coefficient toward zero by `thresh`,
/// zeroing those whose magnitude does not exceed it.
pub fn soft_threshold(band: &mut [f64], thresh: f64) {
    if thresh <= 0.0 {
        return;
    }
    for value in band.iter_mut() {
        let shrunk = value.abs() - thresh;
        *value = if shrunk > 0.0 {
            value.signum() * shrunk
        } else {
            0.0
        };
    }
}

fn median(values: &mut [f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// Median absolute deviation, a robust scale estimate for a coefficient band.
pub fn mad(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    let center = median(&mut sorted);
    let mut deviations: Vec<f64> = values.iter().map(|v| (v - center).abs()).collect();
    median(&mut deviations)
}
