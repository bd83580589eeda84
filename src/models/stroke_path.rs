//! 笔顺路径
//!
//! 内容文件里的笔画用 SVG 路径的子集描述：`M x y`、`L x y`、`Q cx cy x y`。
//! 加载时解析成类型化的指令，格式错误在加载阶段就会报出来。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { control: Point, to: Point },
}

impl PathCommand {
    pub fn end_point(&self) -> Point {
        match self {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => *p,
            PathCommand::QuadTo { to, .. } => *to,
        }
    }
}

/// 一笔的路径
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StrokePath {
    commands: Vec<PathCommand>,
}

impl StrokePath {
    pub fn parse(source: &str) -> Result<Self, ContentError> {
        let invalid = |reason: String| ContentError::InvalidStrokePath {
            path: source.to_string(),
            reason,
        };

        let mut tokens = source.split_whitespace();
        let mut commands = Vec::new();

        while let Some(token) = tokens.next() {
            let mut number = |name: &str| -> Result<f32, ContentError> {
                let raw = tokens
                    .next()
                    .ok_or_else(|| invalid(format!("{} expects more coordinates", name)))?;
                raw.parse::<f32>()
                    .map_err(|_| invalid(format!("{:?} is not a number", raw)))
            };

            let command = match token {
                "M" => PathCommand::MoveTo(Point {
                    x: number("M")?,
                    y: number("M")?,
                }),
                "L" => PathCommand::LineTo(Point {
                    x: number("L")?,
                    y: number("L")?,
                }),
                "Q" => {
                    let control = Point {
                        x: number("Q")?,
                        y: number("Q")?,
                    };
                    let to = Point {
                        x: number("Q")?,
                        y: number("Q")?,
                    };
                    PathCommand::QuadTo { control, to }
                }
                other => return Err(invalid(format!("unsupported command {:?}", other))),
            };
            commands.push(command);
        }

        match commands.first() {
            Some(PathCommand::MoveTo(_)) => Ok(Self { commands }),
            Some(_) => Err(invalid("path must start with M".to_string())),
            None => Err(invalid("path is empty".to_string())),
        }
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// 起笔位置
    pub fn start(&self) -> Point {
        self.commands[0].end_point()
    }

    /// 收笔位置
    pub fn end(&self) -> Point {
        self.commands
            .last()
            .map(PathCommand::end_point)
            .unwrap_or_else(|| self.start())
    }
}

impl TryFrom<String> for StrokePath {
    type Error = ContentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<StrokePath> for String {
    fn from(path: StrokePath) -> Self {
        path.to_string()
    }
}

impl fmt::Display for StrokePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, command) in self.commands.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            match command {
                PathCommand::MoveTo(p) => write!(f, "M {} {}", p.x, p.y)?,
                PathCommand::LineTo(p) => write!(f, "L {} {}", p.x, p.y)?,
                PathCommand::QuadTo { control, to } => {
                    write!(f, "Q {} {} {} {}", control.x, control.y, to.x, to.y)?
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_commands() {
        let path = StrokePath::parse("M 20 15 Q 30 5 40 15 L 25 50").unwrap();
        assert_eq!(path.commands().len(), 3);
        assert_eq!(path.start(), Point { x: 20.0, y: 15.0 });
        assert_eq!(path.end(), Point { x: 25.0, y: 50.0 });
        assert_eq!(path.to_string(), "M 20 15 Q 30 5 40 15 L 25 50");
    }

    #[test]
    fn test_parse_negative_coordinates() {
        let path = StrokePath::parse("M 20 -40 L 40 -50").unwrap();
        assert_eq!(path.end(), Point { x: 40.0, y: -50.0 });
    }

    #[test]
    fn test_parse_rejects_malformed_paths() {
        assert!(StrokePath::parse("").is_err());
        assert!(StrokePath::parse("L 1 2").is_err());
        assert!(StrokePath::parse("M 1").is_err());
        assert!(StrokePath::parse("M 1 x").is_err());
        assert!(StrokePath::parse("M 1 2 C 1 2 3 4 5 6").is_err());
    }
}
