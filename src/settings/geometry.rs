use super::SettingsError;
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Window placement in X geometry form: `WIDTHxHEIGHT[{+-}X{+-}Y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
    pub position: Option<(i32, i32)>,
}

impl Geometry {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            position: None,
        }
    }

    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.position = Some((x, y));
        self
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH, DEFAULT_HEIGHT)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)?;
        if let Some((x, y)) = self.position {
            write!(f, "{x:+}{y:+}")?;
        }
        Ok(())
    }
}

impl FromStr for Geometry {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| SettingsError::InvalidValue {
            key: "geometry".to_string(),
            reason: format!("'{}': {}", s.trim(), reason),
        };

        let s = s.trim();
        let (size, offsets) = match s.find(['+', '-']) {
            Some(at) => s.split_at(at),
            None => (s, ""),
        };

        let (width, height) = size
            .split_once(['x', 'X'])
            .ok_or_else(|| invalid("expected WIDTHxHEIGHT"))?;
        let width: u32 = width.parse().map_err(|_| invalid("bad width"))?;
        let height: u32 = height.parse().map_err(|_| invalid("bad height"))?;
        if width == 0 || height == 0 {
            return Err(invalid("size must be non-zero"));
        }

        let mut geometry = Geometry::new(width, height);
        if !offsets.is_empty() {
            let split = offsets[1..]
                .find(['+', '-'])
                .map(|at| at + 1)
                .ok_or_else(|| invalid("expected both X and Y offsets"))?;
            let (x, y) = offsets.split_at(split);
            let x: i32 = x.parse().map_err(|_| invalid("bad X offset"))?;
            let y: i32 = y.parse().map_err(|_| invalid("bad Y offset"))?;
            geometry.position = Some((x, y));
        }
        Ok(geometry)
    }
}
