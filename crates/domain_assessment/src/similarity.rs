//! Pixel-similarity fallback
//!
//! Used when the detector found nothing in either image. Both images are
//! decoded to grayscale, resized to the smaller common dimensions, and
//! compared with a structural-similarity scorer. The damage ratio is
//! `1 - similarity`, rounded to the configured precision.

use image::imageops::{self, FilterType};
use image::GrayImage;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use core_kernel::{DomainPort, PortError};

use crate::error::{AssessmentError, Capability, ImageRole};
use crate::policy::round_half_away;

/// Port for a grayscale image similarity measure
///
/// Implementations run on a blocking worker and receive images of equal
/// dimensions. The result is in [0, 1], with 1 meaning identical.
pub trait SimilarityScorer: DomainPort {
    fn name(&self) -> &str;

    fn similarity(&self, pre: &GrayImage, post: &GrayImage) -> Result<f64, PortError>;
}

/// Mean structural similarity index over sliding windows
///
/// Uses a uniform square window and sample covariance. When the images are
/// smaller than three pixels along either side a single global window is
/// used instead.
#[derive(Debug, Clone, Copy)]
pub struct SsimScorer {
    window: u32,
    k1: f64,
    k2: f64,
    data_range: f64,
}

impl Default for SsimScorer {
    fn default() -> Self {
        Self {
            window: 7,
            k1: 0.01,
            k2: 0.03,
            data_range: 255.0,
        }
    }
}

impl SsimScorer {
    /// Window side is forced odd and at least 3
    pub fn with_window(window: u32) -> Self {
        let window = window.max(3);
        Self {
            window: if window % 2 == 0 { window + 1 } else { window },
            ..Self::default()
        }
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    fn constants(&self) -> (f64, f64) {
        let c1 = (self.k1 * self.data_range).powi(2);
        let c2 = (self.k2 * self.data_range).powi(2);
        (c1, c2)
    }
}

impl DomainPort for SsimScorer {}

impl SimilarityScorer for SsimScorer {
    fn name(&self) -> &str {
        "ssim"
    }

    fn similarity(&self, pre: &GrayImage, post: &GrayImage) -> Result<f64, PortError> {
        if pre.dimensions() != post.dimensions() {
            return Err(PortError::validation(format!(
                "image dimensions differ: {:?} vs {:?}",
                pre.dimensions(),
                post.dimensions()
            )));
        }
        let (width, height) = pre.dimensions();
        if width == 0 || height == 0 {
            return Err(PortError::validation("images must not be empty"));
        }

        let (c1, c2) = self.constants();
        let mut window = self.window.min(width).min(height);
        if window % 2 == 0 {
            window -= 1;
        }

        let ssim = if window < 3 {
            let mut sums = WindowSums::default();
            for y in 0..height {
                for x in 0..width {
                    sums.add(pixel(pre, x, y), pixel(post, x, y), 1.0);
                }
            }
            sums.ssim((width as f64) * (height as f64), c1, c2)
        } else {
            mean_windowed_ssim(pre, post, window, c1, c2)
        };

        Ok(ssim.clamp(0.0, 1.0))
    }
}

fn pixel(image: &GrayImage, x: u32, y: u32) -> f64 {
    f64::from(image.get_pixel(x, y).0[0])
}

/// Running sums of a, b, a², b² and ab over a window
///
/// Pixel values are integers, so these sums stay exact in f64 while the
/// window slides.
#[derive(Debug, Clone, Copy, Default)]
struct WindowSums {
    a: f64,
    b: f64,
    aa: f64,
    bb: f64,
    ab: f64,
}

impl WindowSums {
    fn add(&mut self, a: f64, b: f64, sign: f64) {
        self.a += sign * a;
        self.b += sign * b;
        self.aa += sign * a * a;
        self.bb += sign * b * b;
        self.ab += sign * a * b;
    }

    fn merge(&mut self, other: &WindowSums, sign: f64) {
        self.a += sign * other.a;
        self.b += sign * other.b;
        self.aa += sign * other.aa;
        self.bb += sign * other.bb;
        self.ab += sign * other.ab;
    }

    fn ssim(&self, n: f64, c1: f64, c2: f64) -> f64 {
        let cov_norm = if n > 1.0 { n / (n - 1.0) } else { 1.0 };
        let mu_a = self.a / n;
        let mu_b = self.b / n;
        let var_a = (self.aa / n - mu_a * mu_a) * cov_norm;
        let var_b = (self.bb / n - mu_b * mu_b) * cov_norm;
        let cov = (self.ab / n - mu_a * mu_b) * cov_norm;

        ((2.0 * mu_a * mu_b + c1) * (2.0 * cov + c2))
            / ((mu_a * mu_a + mu_b * mu_b + c1) * (var_a + var_b + c2))
    }
}

fn add_row(columns: &mut [WindowSums], pre: &GrayImage, post: &GrayImage, y: u32, sign: f64) {
    for (x, column) in columns.iter_mut().enumerate() {
        let x = x as u32;
        column.add(pixel(pre, x, y), pixel(post, x, y), sign);
    }
}

// Column sums slide down one row at a time and the window slides across
// them, so memory stays proportional to the image width.
fn mean_windowed_ssim(pre: &GrayImage, post: &GrayImage, window: u32, c1: f64, c2: f64) -> f64 {
    let (width, height) = pre.dimensions();
    let n = f64::from(window) * f64::from(window);
    let span = window as usize;

    let mut columns = vec![WindowSums::default(); width as usize];
    for y in 0..window {
        add_row(&mut columns, pre, post, y, 1.0);
    }

    let mut total = 0.0;
    let mut count = 0u64;
    for top in 0..=(height - window) {
        if top > 0 {
            add_row(&mut columns, pre, post, top - 1, -1.0);
            add_row(&mut columns, pre, post, top + window - 1, 1.0);
        }

        let mut sums = WindowSums::default();
        for column in &columns[..span] {
            sums.merge(column, 1.0);
        }
        for left in 0..=(columns.len() - span) {
            if left > 0 {
                sums.merge(&columns[left - 1], -1.0);
                sums.merge(&columns[left + span - 1], 1.0);
            }
            total += sums.ssim(n, c1, c2);
            count += 1;
        }
    }

    total / count as f64
}

/// Decodes both images to grayscale at the smaller common size
pub fn prepare_pair(pre: &[u8], post: &[u8]) -> Result<(GrayImage, GrayImage), AssessmentError> {
    let decode = |role: ImageRole, bytes: &[u8]| {
        image::load_from_memory(bytes)
            .map(|image| image.to_luma8())
            .map_err(|err| AssessmentError::ImageDecode {
                image: role,
                reason: err.to_string(),
            })
    };
    let pre = decode(ImageRole::Pre, pre)?;
    let post = decode(ImageRole::Post, post)?;

    let width = pre.width().min(post.width());
    let height = pre.height().min(post.height());
    if width == 0 || height == 0 {
        return Err(AssessmentError::validation("images must have non-zero dimensions"));
    }

    let fit = |image: GrayImage| {
        if image.dimensions() == (width, height) {
            image
        } else {
            imageops::resize(&image, width, height, FilterType::Triangle)
        }
    };
    Ok((fit(pre), fit(post)))
}

/// Computes the pixel-similarity damage ratio of a pair
#[derive(Clone)]
pub struct SimilarityFallback {
    scorer: Arc<dyn SimilarityScorer>,
    timeout: Duration,
    precision: u32,
}

impl SimilarityFallback {
    pub fn new(scorer: Arc<dyn SimilarityScorer>, timeout: Duration, precision: u32) -> Self {
        Self {
            scorer,
            timeout,
            precision,
        }
    }

    pub fn scorer_name(&self) -> &str {
        self.scorer.name()
    }

    /// `1 - similarity`, rounded; decoding and scoring run off the async runtime
    pub async fn damage_ratio(&self, pre: Arc<[u8]>, post: Arc<[u8]>) -> Result<f64, AssessmentError> {
        let scorer = Arc::clone(&self.scorer);
        let task = tokio::task::spawn_blocking(move || {
            let (pre, post) = prepare_pair(&pre, &post)?;
            scorer
                .similarity(&pre, &post)
                .map_err(|source| AssessmentError::inference(Capability::Similarity, source))
        });

        let similarity = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(result)) => result?,
            Ok(Err(join_err)) => {
                return Err(AssessmentError::inference(
                    Capability::Similarity,
                    PortError::internal(format!("similarity worker failed: {join_err}")),
                ))
            }
            Err(_) => {
                return Err(AssessmentError::inference(
                    Capability::Similarity,
                    PortError::timeout("similarity scoring", self.timeout.as_millis() as u64),
                ))
            }
        };

        if !similarity.is_finite() {
            return Err(AssessmentError::inference(
                Capability::Similarity,
                PortError::Transformation {
                    message: format!("scorer returned {similarity}"),
                },
            ));
        }

        let ratio = round_half_away(1.0 - similarity.clamp(0.0, 1.0), self.precision);
        debug!(scorer = self.scorer.name(), similarity, ratio, "Pixel similarity computed");
        Ok(ratio)
    }
}
