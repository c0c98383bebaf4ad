use std::fs;
use std::path::Path;

use crate::mesh::{Mesh, MeshDecoder};
use crate::{Error, Result};

/// Decoder for Stanford PLY geometry in ASCII or binary encoding.
///
/// Reads `x`/`y`/`z` of the `vertex` element and the `vertex_indices`
/// (or `vertex_index`) list of the `face` element; polygons are fan
/// triangulated. Every other element and property is skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlyDecoder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Encoding {
    Ascii,
    BinaryLittleEndian,
    BinaryBigEndian,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scalar {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl Scalar {
    fn parse(name: &str) -> std::result::Result<Self, String> {
        Ok(match name {
            "char" | "int8" => Scalar::I8,
            "uchar" | "uint8" => Scalar::U8,
            "short" | "int16" => Scalar::I16,
            "ushort" | "uint16" => Scalar::U16,
            "int" | "int32" => Scalar::I32,
            "uint" | "uint32" => Scalar::U32,
            "float" | "float32" => Scalar::F32,
            "double" | "float64" => Scalar::F64,
            other => return Err(format!("unknown property type '{other}'")),
        })
    }

    fn size(self) -> usize {
        match self {
            Scalar::I8 | Scalar::U8 => 1,
            Scalar::I16 | Scalar::U16 => 2,
            Scalar::I32 | Scalar::U32 | Scalar::F32 => 4,
            Scalar::F64 => 8,
        }
    }

    /// `bytes` must be exactly `self.size()` long.
    fn decode(self, bytes: &[u8], big_endian: bool) -> f64 {
        macro_rules! read {
            ($t:ty, $n:expr) => {{
                let mut buf = [0u8; $n];
                buf.copy_from_slice(bytes);
                if big_endian {
                    <$t>::from_be_bytes(buf) as f64
                } else {
                    <$t>::from_le_bytes(buf) as f64
                }
            }};
        }
        match self {
            Scalar::I8 => read!(i8, 1),
            Scalar::U8 => read!(u8, 1),
            Scalar::I16 => read!(i16, 2),
            Scalar::U16 => read!(u16, 2),
            Scalar::I32 => read!(i32, 4),
            Scalar::U32 => read!(u32, 4),
            Scalar::F32 => read!(f32, 4),
            Scalar::F64 => read!(f64, 8),
        }
    }
}

#[derive(Debug)]
enum Property {
    Scalar { name: String, ty: Scalar },
    List { name: String, count: Scalar, item: Scalar },
}

#[derive(Debug)]
struct Element {
    name: String,
    count: usize,
    properties: Vec<Property>,
}

#[derive(Debug)]
struct Header {
    encoding: Encoding,
    elements: Vec<Element>,
}

impl Header {
    fn parse(text: &str) -> std::result::Result<Self, String> {
        let mut lines = text.lines().map(str::trim);
        if lines.next() != Some("ply") {
            return Err("missing 'ply' magic".to_string());
        }
        let mut encoding = None;
        let mut elements: Vec<Element> = Vec::new();
        for line in lines {
            let tokens: Vec<&str> = line.split_whitespace().collect();
            match tokens.as_slice() {
                ["format", format, _version] => {
                    encoding = Some(match *format {
                        "ascii" => Encoding::Ascii,
                        "binary_little_endian" => Encoding::BinaryLittleEndian,
                        "binary_big_endian" => Encoding::BinaryBigEndian,
                        other => return Err(format!("unknown format '{other}'")),
                    });
                }
                ["element", name, count] => elements.push(Element {
                    name: name.to_string(),
                    count: count
                        .parse()
                        .map_err(|_| format!("bad element count '{count}'"))?,
                    properties: Vec::new(),
                }),
                ["property", "list", count, item, name] => {
                    let property = Property::List {
                        name: name.to_string(),
                        count: Scalar::parse(count)?,
                        item: Scalar::parse(item)?,
                    };
                    current(&mut elements)?.properties.push(property);
                }
                ["property", ty, name] => {
                    let property = Property::Scalar {
                        name: name.to_string(),
                        ty: Scalar::parse(ty)?,
                    };
                    current(&mut elements)?.properties.push(property);
                }
                [] | ["comment", ..] | ["obj_info", ..] | ["end_header"] => {}
                _ => return Err(format!("unrecognized header line '{line}'")),
            }
        }
        Ok(Self {
            encoding: encoding.ok_or_else(|| "missing format line".to_string())?,
            elements,
        })
    }
}

fn current(elements: &mut [Element]) -> std::result::Result<&mut Element, String> {
    elements
        .last_mut()
        .ok_or_else(|| "property declared before any element".to_string())
}

/// Split the file after its `end_header` line.
fn split_header(bytes: &[u8]) -> std::result::Result<(&str, &[u8]), String> {
    let mut offset = 0;
    for line in bytes.split_inclusive(|&b| b == b'\n') {
        offset += line.len();
        if line.trim_ascii() == b"end_header" {
            let header = std::str::from_utf8(&bytes[..offset])
                .map_err(|_| "header is not valid text".to_string())?;
            return Ok((header, &bytes[offset..]));
        }
    }
    Err("missing end_header".to_string())
}

enum Body<'a> {
    Ascii(std::str::SplitAsciiWhitespace<'a>),
    Binary {
        data: &'a [u8],
        pos: usize,
        big_endian: bool,
    },
}

impl Body<'_> {
    fn read(&mut self, ty: Scalar) -> std::result::Result<f64, String> {
        match self {
            Body::Ascii(tokens) => {
                let token = tokens.next().ok_or_else(truncated)?;
                token
                    .parse::<f64>()
                    .map_err(|_| format!("bad value '{token}'"))
            }
            Body::Binary {
                data,
                pos,
                big_endian,
            } => {
                let end = *pos + ty.size();
                let bytes = data.get(*pos..end).ok_or_else(truncated)?;
                *pos = end;
                Ok(ty.decode(bytes, *big_endian))
            }
        }
    }
}

fn truncated() -> String {
    "unexpected end of data".to_string()
}

/// A list length or vertex index: a non-negative integer below `limit`.
fn as_index(value: f64, limit: usize) -> Option<usize> {
    let valid = value >= 0.0 && value.fract() == 0.0 && value < limit as f64;
    valid.then_some(value as usize)
}

impl PlyDecoder {
    pub fn parse(bytes: &[u8]) -> std::result::Result<Mesh, String> {
        let (header_text, body_bytes) = split_header(bytes)?;
        let header = Header::parse(header_text)?;
        let mut body = match header.encoding {
            Encoding::Ascii => Body::Ascii(
                std::str::from_utf8(body_bytes)
                    .map_err(|_| "ASCII body is not valid text".to_string())?
                    .split_ascii_whitespace(),
            ),
            Encoding::BinaryLittleEndian | Encoding::BinaryBigEndian => Body::Binary {
                data: body_bytes,
                pos: 0,
                big_endian: header.encoding == Encoding::BinaryBigEndian,
            },
        };

        let mut mesh = Mesh::default();
        let mut polygons: Vec<Vec<f64>> = Vec::new();
        for element in &header.elements {
            let is_vertex = element.name == "vertex";
            let is_face = element.name == "face";
            for _ in 0..element.count {
                let mut xyz = [0.0f32; 3];
                for property in &element.properties {
                    match property {
                        Property::Scalar { name, ty } => {
                            let value = body.read(*ty)?;
                            if is_vertex {
                                match name.as_str() {
                                    "x" => xyz[0] = value as f32,
                                    "y" => xyz[1] = value as f32,
                                    "z" => xyz[2] = value as f32,
                                    _ => {}
                                }
                            }
                        }
                        Property::List { name, count, item } => {
                            let raw = body.read(*count)?;
                            let len = as_index(raw, usize::MAX)
                                .ok_or_else(|| format!("bad list length {raw}"))?;
                            let values = (0..len)
                                .map(|_| body.read(*item))
                                .collect::<std::result::Result<Vec<f64>, String>>()?;
                            if is_face && (name == "vertex_indices" || name == "vertex_index") {
                                polygons.push(values);
                            }
                        }
                    }
                }
                if is_vertex {
                    mesh.vertices.push(xyz);
                }
            }
        }

        let vertex_count = mesh.vertices.len();
        for polygon in polygons {
            let indices = polygon
                .iter()
                .map(|&v| as_index(v, vertex_count).map(|i| i as u32))
                .collect::<Option<Vec<u32>>>()
                .ok_or_else(|| "face index out of range".to_string())?;
            if indices.len() < 3 {
                return Err("face needs 3 vertices".to_string());
            }
            for i in 1..indices.len() - 1 {
                mesh.faces.push([indices[0], indices[i], indices[i + 1]]);
            }
        }
        Ok(mesh)
    }
}

impl MeshDecoder for PlyDecoder {
    fn decode(&self, path: &Path) -> Result<Mesh> {
        let is_ply = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ply"));
        if !is_ply {
            return Err(Error::UnsupportedMesh(path.to_path_buf()));
        }
        let bytes = fs::read(path).map_err(|source| Error::File {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&bytes).map_err(|message| Error::MeshDecode {
            path: path.to_path_buf(),
            message,
        })
    }
}
