//! Typed commands.
//!
//! Every `Instruction` is decoded once, at compile time, into either a
//! `Command` with a typed payload or an `InstructionError` explaining why
//! it cannot run. The executor matches on the result exhaustively.

use glam::Vec3;
use thiserror::Error;
use tracing::debug;

use super::source::{Arg, Instruction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Quads,
    QuadStrip,
    Polygon,
}

impl Topology {
    pub const ALL: [Topology; 10] = [
        Topology::Points,
        Topology::Lines,
        Topology::LineStrip,
        Topology::LineLoop,
        Topology::Triangles,
        Topology::TriangleStrip,
        Topology::TriangleFan,
        Topology::Quads,
        Topology::QuadStrip,
        Topology::Polygon,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Topology::Points => "points",
            Topology::Lines => "lines",
            Topology::LineStrip => "line_strip",
            Topology::LineLoop => "line_loop",
            Topology::Triangles => "triangles",
            Topology::TriangleStrip => "triangle_strip",
            Topology::TriangleFan => "triangle_fan",
            Topology::Quads => "quads",
            Topology::QuadStrip => "quad_strip",
            Topology::Polygon => "polygon",
        }
    }

    /// Look up a topology token. Anything unrecognized draws as triangles.
    pub fn from_token(token: &str) -> Topology {
        match Self::ALL.iter().find(|t| t.token() == token) {
            Some(t) => *t,
            None => {
                debug!(token, "unrecognized topology, drawing as triangles");
                Topology::Triangles
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Translate(Vec3),
    /// Angle in degrees about an arbitrary axis.
    Rotate { angle: f32, axis: Vec3 },
    Scale(Vec3),
    Begin(Topology),
    End,
    Vertex(Vec3),
    Color(Vec3),
    Normal(Vec3),
}

/// Reasons an instruction cannot be turned into a `Command`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InstructionError {
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{command}` takes {expected} argument(s), got {found}")]
    Arity {
        command: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("`{command}` argument {index} must be a {expected}, got {found}")]
    ArgumentType {
        command: &'static str,
        index: usize,
        expected: &'static str,
        found: &'static str,
    },
}

impl InstructionError {
    /// Unknown commands are skipped; every other failure stops the frame.
    pub fn is_skippable(&self) -> bool {
        matches!(self, InstructionError::UnknownCommand(_))
    }
}

impl TryFrom<&Instruction> for Command {
    type Error = InstructionError;

    fn try_from(ins: &Instruction) -> Result<Self, Self::Error> {
        let args = &ins.args;
        match ins.command.as_str() {
            "translate3f" => Ok(Command::Translate(vec3("translate3f", args)?)),
            "rotate3f" => {
                let [angle, x, y, z] = numbers::<4>("rotate3f", args)?;
                Ok(Command::Rotate {
                    angle,
                    axis: Vec3::new(x, y, z),
                })
            }
            "scale3f" => Ok(Command::Scale(vec3("scale3f", args)?)),
            "begin" => {
                expect_arity("begin", args, 1)?;
                match &args[0] {
                    Arg::Text(token) => Ok(Command::Begin(Topology::from_token(token))),
                    other => Err(InstructionError::ArgumentType {
                        command: "begin",
                        index: 0,
                        expected: "string",
                        found: other.kind(),
                    }),
                }
            }
            // Trailing arguments to `end` are ignored, as glEnd would.
            "end" => Ok(Command::End),
            "vertex3f" => Ok(Command::Vertex(vec3("vertex3f", args)?)),
            "color3f" => Ok(Command::Color(vec3("color3f", args)?)),
            "normal3f" => Ok(Command::Normal(vec3("normal3f", args)?)),
            other => Err(InstructionError::UnknownCommand(other.to_string())),
        }
    }
}

fn expect_arity(command: &'static str, args: &[Arg], expected: usize) -> Result<(), InstructionError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(InstructionError::Arity {
            command,
            expected,
            found: args.len(),
        })
    }
}

fn numbers<const N: usize>(command: &'static str, args: &[Arg]) -> Result<[f32; N], InstructionError> {
    expect_arity(command, args, N)?;
    let mut out = [0.0; N];
    for (index, (slot, arg)) in out.iter_mut().zip(args).enumerate() {
        *slot = arg.as_number().ok_or(InstructionError::ArgumentType {
            command,
            index,
            expected: "number",
            found: arg.kind(),
        })? as f32;
    }
    Ok(out)
}

fn vec3(command: &'static str, args: &[Arg]) -> Result<Vec3, InstructionError> {
    numbers::<3>(command, args).map(Vec3::from_array)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(command: &str, args: Vec<Arg>) -> Result<Command, InstructionError> {
        Command::try_from(&Instruction::new(command, args))
    }

    #[test]
    fn decodes_transform_commands() {
        assert_eq!(
            decode("translate3f", vec![1.0.into(), 2.0.into(), 3.0.into()]),
            Ok(Command::Translate(Vec3::new(1.0, 2.0, 3.0)))
        );
        assert_eq!(
            decode("rotate3f", vec![90.0.into(), 0.0.into(), 1.0.into(), 0.0.into()]),
            Ok(Command::Rotate {
                angle: 90.0,
                axis: Vec3::Y
            })
        );
    }

    #[test]
    fn every_topology_token_round_trips() {
        for t in Topology::ALL {
            assert_eq!(Topology::from_token(t.token()), t);
        }
    }

    #[test]
    fn unknown_topology_defaults_to_triangles() {
        assert_eq!(
            decode("begin", vec!["GL_HEXAGONS".into()]),
            Ok(Command::Begin(Topology::Triangles))
        );
    }

    #[test]
    fn begin_requires_one_string() {
        assert!(matches!(
            decode("begin", vec![]),
            Err(InstructionError::Arity { expected: 1, found: 0, .. })
        ));
        assert!(matches!(
            decode("begin", vec![4.0.into()]),
            Err(InstructionError::ArgumentType { found: "number", .. })
        ));
    }

    #[test]
    fn wrong_arity_and_types_are_not_skippable() {
        let err = decode("vertex3f", vec![1.0.into(), 2.0.into()]).unwrap_err();
        assert!(!err.is_skippable());
        assert_eq!(err.to_string(), "`vertex3f` takes 3 argument(s), got 2");

        let err = decode("color3f", vec![1.0.into(), "x".into(), 0.0.into()]).unwrap_err();
        assert!(!err.is_skippable());
        assert_eq!(
            err.to_string(),
            "`color3f` argument 1 must be a number, got string"
        );
    }

    #[test]
    fn unknown_command_is_skippable() {
        let err = decode("teapot", vec![]).unwrap_err();
        assert!(err.is_skippable());
        assert_eq!(err.to_string(), "unknown command `teapot`");
    }
}
