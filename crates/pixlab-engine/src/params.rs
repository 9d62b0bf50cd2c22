//! Typed operation parameters.
//!
//! Requests arrive as a name plus a loose JSON object
//! ([`OperationRequest`]). [`parse_request`] turns them into an
//! [`Operation`], the tagged union the engine dispatches on. After parsing,
//! every parameter is present, has the right type and is inside its bounds,
//! so the operations themselves never look at raw JSON.
//!
//! Parsing rejects missing or mistyped values and keys the operation does not
//! know, always as [`Error::InvalidParameter`] naming the operation and key.

use pixlab_core::{Error, Rect, Result};
use pixlab_ops::{
    BrightnessMode, ChannelOp, ChannelOutput, ColorModel, ContrastMode, FillPolicy, GrayMethod,
    Interpolation,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::catalogue::{OperationKind, Preset, resolve};
use crate::config::EngineConfig;

/// An operation name with its raw parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OperationRequest {
    /// Operation name or legacy alias.
    pub operation: String,
    /// Operation-specific parameters.
    #[serde(default)]
    pub params: Map<String, Value>,
}

impl OperationRequest {
    /// Request without parameters.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            params: Map::new(),
        }
    }

    /// Adds one parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}

/// How a merge weights its two inputs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeWeight {
    /// One weight for the whole image.
    Alpha(f32),
    /// Per-pixel weights from the mask input.
    Mask,
}

/// A fully validated operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "kebab-case")]
pub enum Operation {
    /// Brightness shift or scale.
    Brightness {
        /// Offset or multiplier.
        factor: f32,
        /// How `factor` is applied.
        mode: BrightnessMode,
    },
    /// Contrast curve.
    Contrast(ContrastMode),
    /// Color negative.
    Negative,
    /// Gray reduction.
    Grayscale {
        /// Reduction method.
        method: GrayMethod,
    },
    /// Threshold, optionally after a gray reduction.
    Binarize {
        /// Cut-off in `[0, 1]`.
        threshold: f32,
        /// Reduce to gray first with this method.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        grayscale: Option<GrayMethod>,
    },
    /// Rotation in degrees, counter-clockwise.
    Rotate {
        /// Angle in degrees.
        angle: f64,
        /// Sampling method.
        interpolation: Interpolation,
        /// Value for uncovered pixels.
        fill: FillPolicy,
    },
    /// Rectangular crop.
    Crop {
        /// Kept region.
        region: Rect,
    },
    /// Integer shift.
    Translate {
        /// Horizontal shift, positive to the right.
        dx: i64,
        /// Vertical shift, positive downwards.
        dy: i64,
        /// Value for vacated pixels.
        fill: FillPolicy,
    },
    /// Box-filter down-sampling.
    ReduceResolution {
        /// Reduction factor, `>= 1`.
        factor: f64,
    },
    /// Crop and bilinear up-sampling.
    EnlargeRegion {
        /// Source region.
        region: Rect,
        /// Target width.
        width: u32,
        /// Target height.
        height: u32,
    },
    /// Weighted blend with the secondary input.
    Merge {
        /// Weight of the primary input.
        weight: MergeWeight,
    },
    /// Channel algebra.
    Channel(ChannelOp),
    /// Histogram query.
    Histogram,
}

impl Operation {
    /// Catalogue entry of this operation.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Brightness { .. } => OperationKind::Brightness,
            Self::Contrast(_) => OperationKind::Contrast,
            Self::Negative => OperationKind::Negative,
            Self::Grayscale { .. } => OperationKind::Grayscale,
            Self::Binarize { .. } => OperationKind::Binarize,
            Self::Rotate { .. } => OperationKind::Rotate,
            Self::Crop { .. } => OperationKind::Crop,
            Self::Translate { .. } => OperationKind::Translate,
            Self::ReduceResolution { .. } => OperationKind::ReduceResolution,
            Self::EnlargeRegion { .. } => OperationKind::EnlargeRegion,
            Self::Merge { .. } => OperationKind::Merge,
            Self::Channel(_) => OperationKind::Channel,
            Self::Histogram => OperationKind::Histogram,
        }
    }
}

/// Resolves the name and validates the parameters of `request`.
pub fn parse_request(request: &OperationRequest, config: &EngineConfig) -> Result<Operation> {
    let (kind, preset) = resolve(&request.operation)?;
    trace!(requested = %request.operation, %kind, ?preset, "params::parse_request");
    let mut p = Params::new(kind.name(), &request.params);

    let op = match kind {
        OperationKind::Brightness => brightness(&mut p, config)?,
        OperationKind::Contrast => contrast(&mut p, preset, config)?,
        OperationKind::Negative => Operation::Negative,
        OperationKind::Grayscale => {
            let default = match preset {
                Preset::Gray(method) => method,
                _ => GrayMethod::default(),
            };
            Operation::Grayscale {
                method: p.parsed("method")?.unwrap_or(default),
            }
        }
        OperationKind::Binarize => Operation::Binarize {
            threshold: p.unit("threshold")?.unwrap_or(config.default_threshold),
            grayscale: p.parsed("grayscale")?,
        },
        OperationKind::Rotate => {
            let angle = p.require("angle", Params::number)?;
            if !angle.is_finite() {
                return Err(p.invalid("angle", "a finite number of degrees"));
            }
            Operation::Rotate {
                angle,
                interpolation: p.parsed("interpolation")?.unwrap_or(config.interpolation),
                fill: p.fill()?,
            }
        }
        OperationKind::Crop => Operation::Crop {
            region: p.region()?,
        },
        OperationKind::Translate => Operation::Translate {
            dx: p.int("dx")?.unwrap_or(0),
            dy: p.int("dy")?.unwrap_or(0),
            fill: p.fill()?,
        },
        OperationKind::ReduceResolution => {
            let factor = p.number("factor")?.unwrap_or(2.0);
            if !(factor.is_finite() && factor >= 1.0 && factor <= config.max_reduce_factor) {
                return Err(p.invalid(
                    "factor",
                    format!("a number in [1, {}]", config.max_reduce_factor),
                ));
            }
            Operation::ReduceResolution { factor }
        }
        OperationKind::EnlargeRegion => enlarge(&mut p, config)?,
        OperationKind::Merge => merge(&mut p, preset)?,
        OperationKind::Channel => Operation::Channel(channel(&mut p, preset)?),
        OperationKind::Histogram => Operation::Histogram,
    };

    p.finish()?;
    Ok(op)
}

fn brightness(p: &mut Params<'_>, config: &EngineConfig) -> Result<Operation> {
    let factor = p.require("factor", Params::number_f32)?;
    let mode: BrightnessMode = p.parsed("mode")?.unwrap_or_default();
    let bounds = match mode {
        BrightnessMode::Additive => config.additive_brightness,
        BrightnessMode::Multiplicative => config.multiplicative_brightness,
    };
    if !bounds.contains(factor) {
        return Err(p.invalid("factor", bounds.describe()));
    }
    Ok(Operation::Brightness { factor, mode })
}

#[derive(Clone, Copy)]
enum Curve {
    Log,
    Exp,
}

fn contrast(p: &mut Params<'_>, preset: Preset, config: &EngineConfig) -> Result<Operation> {
    let curve = match preset {
        Preset::LogContrast => Curve::Log,
        Preset::ExpContrast => Curve::Exp,
        _ => {
            let mode = p.require("mode", Params::string)?;
            match mode.to_ascii_lowercase().as_str() {
                "logarithmic" | "log" => Curve::Log,
                "exponential" | "exp" | "gamma" => Curve::Exp,
                _ => return Err(p.invalid("mode", "logarithmic or exponential")),
            }
        }
    };

    let (key, value) = match curve {
        Curve::Log => ("k", p.require("k", Params::number_f32)?),
        Curve::Exp if matches!(preset, Preset::ExpContrast) && p.has("k") => {
            ("k", p.require("k", Params::number_f32)?)
        }
        Curve::Exp => ("gamma", p.require("gamma", Params::number_f32)?),
    };
    if !(value.is_finite() && value > 0.0 && value <= config.max_contrast_coefficient) {
        return Err(p.invalid(
            key,
            format!("a number in (0, {}]", config.max_contrast_coefficient),
        ));
    }

    Ok(Operation::Contrast(match curve {
        Curve::Log => ContrastMode::Logarithmic { k: value },
        Curve::Exp => ContrastMode::Exponential { gamma: value },
    }))
}

fn enlarge(p: &mut Params<'_>, config: &EngineConfig) -> Result<Operation> {
    let region = p.region()?;
    let width = p.uint("target_width")?;
    let height = p.uint("target_height")?;
    let (width, height) = match (width, height) {
        (Some(w), Some(h)) => {
            if p.has("factor") {
                return Err(p.invalid("factor", "either a target size or a factor, not both"));
            }
            (w, h)
        }
        (None, None) => {
            let factor = p.uint("factor")?.unwrap_or(2);
            if factor == 0 {
                return Err(p.invalid("factor", "an integer >= 1"));
            }
            (
                region.width.saturating_mul(factor),
                region.height.saturating_mul(factor),
            )
        }
        _ => return Err(p.invalid("target", "both target_width and target_height")),
    };

    if width < region.width || height < region.height {
        return Err(p.invalid(
            "target",
            format!("a target of at least {}x{}", region.width, region.height),
        ));
    }
    if width > config.max_enlarge_edge || height > config.max_enlarge_edge {
        return Err(p.invalid(
            "target",
            format!("edges of at most {} pixels", config.max_enlarge_edge),
        ));
    }
    Ok(Operation::EnlargeRegion {
        region,
        width,
        height,
    })
}

fn merge(p: &mut Params<'_>, preset: Preset) -> Result<Operation> {
    let mask = p.flag("mask")?.unwrap_or(false);
    let alpha = p.unit("alpha")?;
    // legacy weight belongs to the second image
    let transparency = if matches!(preset, Preset::LegacyMerge) {
        p.unit("transparency")?.map(|t| 1.0 - t)
    } else {
        None
    };

    if alpha.is_some() && transparency.is_some() {
        return Err(p.invalid("transparency", "either alpha or transparency, not both"));
    }
    let weight = match (mask, alpha.or(transparency)) {
        (true, Some(_)) => return Err(p.invalid("mask", "either mask or alpha, not both")),
        (true, None) => MergeWeight::Mask,
        (false, Some(a)) => MergeWeight::Alpha(a),
        (false, None) => MergeWeight::Alpha(0.5),
    };
    Ok(Operation::Merge { weight })
}

const PLANES: [(&str, ColorModel, usize); 6] = [
    ("red", ColorModel::Rgb, 0),
    ("green", ColorModel::Rgb, 1),
    ("blue", ColorModel::Rgb, 2),
    ("cyan", ColorModel::Cmy, 0),
    ("magenta", ColorModel::Cmy, 1),
    ("yellow", ColorModel::Cmy, 2),
];

fn channel(p: &mut Params<'_>, preset: Preset) -> Result<ChannelOp> {
    let plane = match preset {
        Preset::Plane(model, index) => Some((model, index)),
        _ => match p.string("channel")? {
            Some(name) => {
                let name = name.to_ascii_lowercase();
                let found = PLANES.iter().find(|(n, _, _)| *n == name);
                match found {
                    Some(&(_, model, index)) => Some((model, index)),
                    None => {
                        return Err(
                            p.invalid("channel", "red, green, blue, cyan, magenta or yellow")
                        );
                    }
                }
            }
            None => None,
        },
    };

    if let Some((model, index)) = plane {
        let enabled = p.flag("enabled")?.unwrap_or(true);
        return Ok(match model {
            ColorModel::Rgb => {
                let mut keep = [!enabled; 3];
                keep[index] = enabled;
                ChannelOp::mask(ColorModel::Rgb, keep)
            }
            ColorModel::Cmy => ChannelOp::extract(ColorModel::Cmy, index),
        });
    }

    let mut op = ChannelOp {
        model: p.parsed("model")?.unwrap_or_default(),
        ..ChannelOp::default()
    };
    if let Some(order) = p.array3("order", Params::index)? {
        op.order = order;
    }
    if let Some(keep) = p.array3("keep", Params::boolean)? {
        op.keep = keep;
    }
    let output = p.string("output")?;
    let extract = p.uint("extract")?;
    op.output = match (output.as_deref().map(str::to_ascii_lowercase).as_deref(), extract) {
        (None | Some("extract"), Some(i)) => ChannelOutput::Extract(i as usize),
        (None | Some("model"), None) => ChannelOutput::Model,
        (Some("rgb"), None) => ChannelOutput::Rgb,
        (Some("extract"), None) => return Err(p.invalid("extract", "a plane index in 0..=2")),
        _ => return Err(p.invalid("output", "model, rgb or extract")),
    };
    op.validate()?;
    Ok(op)
}

/// Typed reader over a parameter map that remembers which keys were used.
struct Params<'a> {
    operation: &'static str,
    map: &'a Map<String, Value>,
    used: Vec<&'a str>,
}

impl<'a> Params<'a> {
    fn new(operation: &'static str, map: &'a Map<String, Value>) -> Self {
        Self {
            operation,
            map,
            used: Vec::new(),
        }
    }

    fn invalid(&self, parameter: &str, expected: impl Into<String>) -> Error {
        Error::invalid_parameter(self.operation, parameter, expected)
    }

    fn has(&self, key: &str) -> bool {
        self.map.get(key).is_some_and(|v| !v.is_null())
    }

    /// Raw value; `null` counts as absent.
    fn take(&mut self, key: &str) -> Option<&'a Value> {
        let (k, v) = self.map.iter().find(|(k, _)| k.as_str() == key)?;
        self.used.push(k.as_str());
        (!v.is_null()).then_some(v)
    }

    fn typed<T>(
        &mut self,
        key: &str,
        expected: &str,
        convert: impl FnOnce(&Value) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.take(key) {
            None => Ok(None),
            Some(v) => convert(v).map(Some).ok_or_else(|| self.invalid(key, expected)),
        }
    }

    fn require<T>(
        &mut self,
        key: &str,
        read: fn(&mut Self, &str) -> Result<Option<T>>,
    ) -> Result<T> {
        read(self, key)?.ok_or_else(|| self.invalid(key, "a value (missing)"))
    }

    fn number(&mut self, key: &str) -> Result<Option<f64>> {
        self.typed(key, "a number", Value::as_f64)
    }

    fn number_f32(&mut self, key: &str) -> Result<Option<f32>> {
        Ok(self.number(key)?.map(|v| v as f32))
    }

    /// Number in `[0, 1]`.
    fn unit(&mut self, key: &str) -> Result<Option<f32>> {
        match self.number_f32(key)? {
            Some(v) if !(0.0..=1.0).contains(&v) => Err(self.invalid(key, "a number in [0, 1]")),
            v => Ok(v),
        }
    }

    fn int(&mut self, key: &str) -> Result<Option<i64>> {
        self.typed(key, "an integer", as_integer)
    }

    fn uint(&mut self, key: &str) -> Result<Option<u32>> {
        self.typed(key, "a non-negative integer", |v| {
            as_integer(v).and_then(|i| u32::try_from(i).ok())
        })
    }

    fn flag(&mut self, key: &str) -> Result<Option<bool>> {
        self.typed(key, "true or false", Value::as_bool)
    }

    fn string(&mut self, key: &str) -> Result<Option<String>> {
        self.typed(key, "a string", |v| v.as_str().map(str::to_owned))
    }

    /// String parsed through `FromStr`, re-keyed to this operation.
    fn parsed<T: std::str::FromStr<Err = Error>>(&mut self, key: &str) -> Result<Option<T>> {
        match self.string(key)? {
            None => Ok(None),
            Some(s) => s.parse().map(Some).map_err(|e| match e {
                Error::InvalidParameter { expected, .. } => self.invalid(key, expected),
                other => other,
            }),
        }
    }

    fn index(v: &Value) -> Option<usize> {
        as_integer(v).and_then(|i| usize::try_from(i).ok())
    }

    fn boolean(v: &Value) -> Option<bool> {
        v.as_bool()
    }

    fn array3<T: Copy + Default>(
        &mut self,
        key: &str,
        item: fn(&Value) -> Option<T>,
    ) -> Result<Option<[T; 3]>> {
        self.typed(key, "an array of 3 items", |v| {
            let items = v.as_array()?;
            if items.len() != 3 {
                return None;
            }
            let mut out = [T::default(); 3];
            for (o, v) in out.iter_mut().zip(items) {
                *o = item(v)?;
            }
            Some(out)
        })
    }

    /// `"zero"`, or an array with one value per channel.
    fn fill(&mut self) -> Result<FillPolicy> {
        let Some(v) = self.take("fill") else {
            return Ok(FillPolicy::Zero);
        };
        if v.as_str().is_some_and(|s| s.eq_ignore_ascii_case("zero")) {
            return Ok(FillPolicy::Zero);
        }
        v.as_array()
            .and_then(|items| {
                items
                    .iter()
                    .map(|x| x.as_f64().map(|f| f as f32))
                    .collect::<Option<Vec<f32>>>()
            })
            .map(FillPolicy::Color)
            .ok_or_else(|| self.invalid("fill", "\"zero\" or an array of channel values"))
    }

    /// `x, y, width, height` or the legacy `x_start, x_end, y_start, y_end`.
    fn region(&mut self) -> Result<Rect> {
        if self.has("x_start") || self.has("x_end") || self.has("y_start") || self.has("y_end") {
            let x0 = self.require("x_start", Self::uint)?;
            let x1 = self.require("x_end", Self::uint)?;
            let y0 = self.require("y_start", Self::uint)?;
            let y1 = self.require("y_end", Self::uint)?;
            if x1 <= x0 || y1 <= y0 {
                return Err(self.invalid("region", "x_end > x_start and y_end > y_start"));
            }
            return Ok(Rect::new(x0, y0, x1 - x0, y1 - y0));
        }
        Ok(Rect::new(
            self.uint("x")?.unwrap_or(0),
            self.uint("y")?.unwrap_or(0),
            self.require("width", Self::uint)?,
            self.require("height", Self::uint)?,
        ))
    }

    /// Rejects keys nobody read.
    fn finish(self) -> Result<()> {
        let mut unknown: Vec<&str> = self
            .map
            .keys()
            .map(String::as_str)
            .filter(|k| !self.used.contains(k))
            .collect();
        unknown.sort_unstable();
        match unknown.first() {
            None => Ok(()),
            Some(key) => Err(self.invalid(key, "no such parameter")),
        }
    }
}

/// Integer value, accepting floats with no fractional part.
fn as_integer(v: &Value) -> Option<i64> {
    v.as_i64().or_else(|| {
        v.as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
            .map(|f| f as i64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(op: &str, params: Value) -> Result<Operation> {
        let request = OperationRequest {
            operation: op.into(),
            params: params.as_object().cloned().unwrap_or_default(),
        };
        parse_request(&request, &EngineConfig::default())
    }

    fn bad_param(result: Result<Operation>) -> String {
        match result {
            Err(Error::InvalidParameter { parameter, .. }) => parameter,
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
    }

    #[test]
    fn test_brightness_defaults_and_bounds() {
        assert_eq!(
            parse("brightness", json!({"factor": 0.25})).unwrap(),
            Operation::Brightness {
                factor: 0.25,
                mode: BrightnessMode::Additive
            }
        );
        let op = parse("brightness", json!({"factor": 1.5, "mode": "multiplicative"})).unwrap();
        assert!(matches!(op, Operation::Brightness { mode: BrightnessMode::Multiplicative, .. }));
        assert_eq!(bad_param(parse("brightness", json!({"factor": 1.5}))), "factor");
        assert_eq!(bad_param(parse("brightness", json!({}))), "factor");
        assert_eq!(bad_param(parse("brightness", json!({"factor": "1"}))), "factor");
    }

    #[test]
    fn test_contrast_modes() {
        assert_eq!(
            parse("contrast", json!({"mode": "log", "k": 9.0})).unwrap(),
            Operation::Contrast(ContrastMode::Logarithmic { k: 9.0 })
        );
        assert_eq!(
            parse("exp_contrast", json!({"k": 2.0})).unwrap(),
            Operation::Contrast(ContrastMode::Exponential { gamma: 2.0 })
        );
        assert_eq!(
            parse("contrast", json!({"mode": "exponential", "gamma": 0.5})).unwrap(),
            Operation::Contrast(ContrastMode::Exponential { gamma: 0.5 })
        );
        assert_eq!(bad_param(parse("contrast", json!({"k": 2.0}))), "mode");
        assert_eq!(bad_param(parse("log_contrast", json!({"k": -1.0}))), "k");
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert_eq!(bad_param(parse("negative", json!({"strength": 1}))), "strength");
        assert_eq!(bad_param(parse("rotate", json!({"angle": 10, "angel": 3}))), "angel");
    }

    #[test]
    fn test_grayscale_alias_and_override() {
        assert_eq!(
            parse("grayscale_average", json!({})).unwrap(),
            Operation::Grayscale {
                method: GrayMethod::Average
            }
        );
        assert_eq!(
            parse("grayscale", json!({})).unwrap(),
            Operation::Grayscale {
                method: GrayMethod::Luminosity
            }
        );
        assert_eq!(bad_param(parse("grayscale", json!({"method": "sepia"}))), "method");
    }

    #[test]
    fn test_binarize_threshold() {
        assert_eq!(
            parse("binarize", json!({})).unwrap(),
            Operation::Binarize {
                threshold: 0.5,
                grayscale: None
            }
        );
        assert_eq!(bad_param(parse("binarize", json!({"threshold": 1.2}))), "threshold");
    }

    #[test]
    fn test_enum_parse_errors_name_request_key() {
        match parse("binarize", json!({"grayscale": "sepia"})) {
            Err(Error::InvalidParameter {
                operation,
                parameter,
                expected,
            }) => {
                assert_eq!(operation, "binarize");
                assert_eq!(parameter, "grayscale");
                assert_eq!(expected, "average, luminosity or lightness");
            }
            other => panic!("expected InvalidParameter, got {other:?}"),
        }
        let cubic = parse("rotate", json!({"angle": 5, "interpolation": "cubic"}));
        assert_eq!(bad_param(cubic), "interpolation");
        assert_eq!(bad_param(parse("channel", json!({"model": "hsv"}))), "model");
    }

    #[test]
    fn test_region_forms() {
        let a = parse("crop", json!({"x": 2, "y": 1, "width": 3, "height": 4})).unwrap();
        let b = parse("crop", json!({"x_start": 2, "x_end": 5, "y_start": 1, "y_end": 5})).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Operation::Crop { region: Rect::new(2, 1, 3, 4) });
        assert_eq!(bad_param(parse("crop", json!({"x": 0, "width": 3}))), "height");
        assert_eq!(bad_param(parse("crop", json!({"x": -1, "width": 3, "height": 3}))), "x");
    }

    #[test]
    fn test_translate_and_fill() {
        let op = parse("translate", json!({"dx": -3, "fill": [1.0, 0.5, 0.0]})).unwrap();
        assert_eq!(
            op,
            Operation::Translate {
                dx: -3,
                dy: 0,
                fill: FillPolicy::Color(vec![1.0, 0.5, 0.0])
            }
        );
        assert_eq!(bad_param(parse("translate", json!({"dx": 1.5}))), "dx");
        assert_eq!(bad_param(parse("translate", json!({"fill": "white"}))), "fill");
    }

    #[test]
    fn test_enlarge_targets() {
        let op = parse("enlarge_region", json!({"x": 0, "y": 0, "width": 2, "height": 3})).unwrap();
        assert_eq!(
            op,
            Operation::EnlargeRegion {
                region: Rect::new(0, 0, 2, 3),
                width: 4,
                height: 6
            }
        );
        let err = parse(
            "enlarge-region",
            json!({"x_start": 0, "x_end": 4, "y_start": 0, "y_end": 4, "factor": 100000}),
        );
        assert_eq!(bad_param(err), "target");
    }

    #[test]
    fn test_reduce_factor_bounds() {
        assert_eq!(
            parse("reduce_resolution", json!({})).unwrap(),
            Operation::ReduceResolution { factor: 2.0 }
        );
        assert_eq!(bad_param(parse("reduce_resolution", json!({"factor": 0.5}))), "factor");
    }

    #[test]
    fn test_merge_weights() {
        assert_eq!(
            parse("merge", json!({"alpha": 0.25})).unwrap(),
            Operation::Merge {
                weight: MergeWeight::Alpha(0.25)
            }
        );
        assert_eq!(
            parse("merge_images", json!({"transparency": 0.25})).unwrap(),
            Operation::Merge {
                weight: MergeWeight::Alpha(0.75)
            }
        );
        assert_eq!(
            parse("merge", json!({"mask": true})).unwrap(),
            Operation::Merge {
                weight: MergeWeight::Mask
            }
        );
        assert_eq!(bad_param(parse("merge", json!({"transparency": 0.5}))), "transparency");
        assert_eq!(bad_param(parse("merge", json!({"alpha": -0.1}))), "alpha");
        assert_eq!(
            bad_param(parse("merge_images", json!({"alpha": 0.5, "transparency": 0.5}))),
            "transparency"
        );
        assert_eq!(
            bad_param(parse("merge_images", json!({"mask": true, "transparency": 0.5}))),
            "mask"
        );
    }

    #[test]
    fn test_channel_forms() {
        assert_eq!(
            parse("channel_red", json!({"enabled": false})).unwrap(),
            Operation::Channel(ChannelOp::mask(ColorModel::Rgb, [false, true, true]))
        );
        assert_eq!(
            parse("channel", json!({"channel": "green"})).unwrap(),
            Operation::Channel(ChannelOp::mask(ColorModel::Rgb, [false, true, false]))
        );
        assert_eq!(
            parse("channel_yellow", json!({})).unwrap(),
            Operation::Channel(ChannelOp::extract(ColorModel::Cmy, 2))
        );
        let op = parse(
            "channel",
            json!({
                "model": "cmy",
                "order": [2, 0, 1],
                "keep": [true, true, false],
                "output": "rgb"
            }),
        )
        .unwrap();
        assert_eq!(
            op,
            Operation::Channel(ChannelOp {
                model: ColorModel::Cmy,
                order: [2, 0, 1],
                keep: [true, true, false],
                output: ChannelOutput::Rgb,
            })
        );
        assert_eq!(bad_param(parse("channel", json!({"order": [0, 0, 1]}))), "order");
        assert_eq!(bad_param(parse("channel", json!({"extract": 5}))), "extract");
    }

    #[test]
    fn test_operation_serializes_tagged() {
        let op = parse("rotate", json!({"angle": 90})).unwrap();
        let v = serde_json::to_value(&op).unwrap();
        assert_eq!(v["operation"], "rotate");
        assert_eq!(v["angle"], 90.0);
        assert_eq!(v["interpolation"], "bilinear");

        let contrast = Operation::Contrast(ContrastMode::Logarithmic { k: 2.0 });
        let v = serde_json::to_value(&contrast).unwrap();
        assert_eq!(v["operation"], "contrast");
        assert_eq!(v["mode"], "logarithmic");
    }
}
