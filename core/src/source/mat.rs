//! MAT level-5 sources.
//!
//! Decodes the variables of a MAT file into a `MatValue` tree. Supported
//! classes: numeric arrays (any storage type, widened to f64), char arrays,
//! cell arrays and struct arrays. Compressed variables are inflated first.
//! Other classes decode to `MatValue::Unsupported` and are never read.
//!
//! A `MatTable` is one struct inside the tree, e.g. `entity.assets`, whose
//! fields are looked up by key like spreadsheet columns.

use super::ColumnSource;
use crate::error::{EntityError, EntityResult};
use flate2::read::ZlibDecoder;
use nom::{
    bytes::complete::take,
    combinator::map,
    multi::many0,
    number::{complete as num, Endianness},
    IResult,
};
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

const HEADER_LEN: usize = 128;

// Data types.
const MI_INT8:       u32 = 1;
const MI_UINT8:      u32 = 2;
const MI_INT16:      u32 = 3;
const MI_UINT16:     u32 = 4;
const MI_INT32:      u32 = 5;
const MI_UINT32:     u32 = 6;
const MI_SINGLE:     u32 = 7;
const MI_DOUBLE:     u32 = 9;
const MI_INT64:      u32 = 12;
const MI_UINT64:     u32 = 13;
const MI_MATRIX:     u32 = 14;
const MI_COMPRESSED: u32 = 15;
const MI_UTF8:       u32 = 16;
const MI_UTF16:      u32 = 17;
const MI_UTF32:      u32 = 18;

// Array classes.
const MX_CELL:   u32 = 1;
const MX_STRUCT: u32 = 2;
const MX_CHAR:   u32 = 4;
const MX_DOUBLE: u32 = 6;
const MX_UINT64: u32 = 15;

type Res<'a, T> = IResult<&'a [u8], T>;

#[derive(Debug, Clone, PartialEq)]
pub enum MatValue {
    /// Column-major numeric data.
    Numeric { dims: Vec<usize>, data: Vec<f64> },
    /// One string per row of the char matrix, trailing blanks removed.
    Char { rows: Vec<String> },
    Cell { dims: Vec<usize>, items: Vec<MatValue> },
    /// `elements[i][j]` is field `fields[j]` of element `i`.
    Struct {
        dims:     Vec<usize>,
        fields:   Vec<String>,
        elements: Vec<Vec<MatValue>>,
    },
    Unsupported { class: u32 },
    Empty,
}

impl MatValue {
    /// Field of the first element of a struct.
    pub fn field(&self, name: &str) -> Option<&MatValue> {
        match self {
            MatValue::Struct { fields, elements, .. } => {
                let idx = fields.iter().position(|f| f == name)?;
                elements.first()?.get(idx)
            }
            _ => None,
        }
    }

    /// Follow nested struct fields.
    pub fn path(&self, keys: &[&str]) -> Option<&MatValue> {
        keys.iter().try_fold(self, |value, key| value.field(key))
    }

    /// Strings held by a char array or a cell array of char arrays.
    pub fn strings(&self) -> Option<Vec<String>> {
        match self {
            MatValue::Char { rows } => Some(rows.clone()),
            MatValue::Cell { items, .. } => items
                .iter()
                .map(|item| match item {
                    MatValue::Char { rows } => Some(rows.join("")),
                    MatValue::Empty => Some(String::new()),
                    _ => None,
                })
                .collect(),
            MatValue::Empty => Some(Vec::new()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatFile {
    variables: BTreeMap<String, MatValue>,
}

impl MatFile {
    pub fn open(file_name: &Path) -> EntityResult<Self> {
        log::info!("Reading file: {}", file_name.display());
        let bytes = std::fs::read(file_name)?;
        Self::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> EntityResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(malformed("file shorter than the MAT header"));
        }
        let endian = match &bytes[HEADER_LEN - 2..HEADER_LEN] {
            b"IM" => Endianness::Little,
            b"MI" => Endianness::Big,
            _ => return Err(malformed("missing endian indicator")),
        };

        let mut variables = BTreeMap::new();
        let mut rest = &bytes[HEADER_LEN..];
        while !rest.is_empty() {
            let (next, el) = next_element(rest, endian)?;
            rest = next;
            let (name, value) = match el.ty {
                MI_MATRIX => matrix(el.data, endian)?,
                MI_COMPRESSED => {
                    let mut inflated = Vec::new();
                    ZlibDecoder::new(el.data).read_to_end(&mut inflated)?;
                    let (_, inner) = next_element(&inflated, endian)?;
                    if inner.ty != MI_MATRIX {
                        continue;
                    }
                    matrix(inner.data, endian)?
                }
                _ => continue,
            };
            variables.insert(name, value);
        }
        Ok(Self { variables })
    }

    pub fn get(&self, name: &str) -> Option<&MatValue> {
        self.variables.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    /// The struct reached by `keys`: first key is a variable, the rest are
    /// nested fields. `MissingSheet` naming the dotted path if absent.
    pub fn table(&self, keys: &[&str]) -> EntityResult<MatTable<'_>> {
        let name = keys.join(".");
        let value = keys
            .split_first()
            .and_then(|(var, fields)| self.get(var)?.path(fields))
            .filter(|v| matches!(v, MatValue::Struct { .. }))
            .ok_or_else(|| EntityError::MissingSheet { sheet: name.clone() })?;
        log::info!("Reading table '{name}'");
        Ok(MatTable { name, value })
    }
}

/// Conversion of a MAT array into typed values.
pub trait FromMat: Sized {
    const KIND: &'static str;

    fn from_mat(value: &MatValue) -> Option<Vec<Self>>;
}

impl FromMat for f64 {
    const KIND: &'static str = "numbers";

    fn from_mat(value: &MatValue) -> Option<Vec<Self>> {
        match value {
            MatValue::Numeric { data, .. } => Some(data.clone()),
            MatValue::Empty => Some(Vec::new()),
            _ => None,
        }
    }
}

impl FromMat for i64 {
    const KIND: &'static str = "integers";

    fn from_mat(value: &MatValue) -> Option<Vec<Self>> {
        f64::from_mat(value)?
            .into_iter()
            .map(|v| (v.is_finite() && v.fract() == 0.0).then_some(v as i64))
            .collect()
    }
}

impl FromMat for String {
    const KIND: &'static str = "strings";

    fn from_mat(value: &MatValue) -> Option<Vec<Self>> {
        value.strings()
    }
}

/// One struct of a MAT file, read field by field.
#[derive(Debug, Clone)]
pub struct MatTable<'a> {
    name:  String,
    value: &'a MatValue,
}

impl MatTable<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.value.field(key).is_some()
    }
}

impl<T: FromMat> ColumnSource<T> for MatTable<'_> {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn column(&self, key: &str) -> EntityResult<Option<Vec<T>>> {
        let Some(value) = self.value.field(key) else {
            return Ok(None);
        };
        T::from_mat(value).map(Some).ok_or_else(|| {
            malformed(format!("{}.{key}: expected {}", self.name, T::KIND))
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Element<'a> {
    ty:   u32,
    data: &'a [u8],
}

fn malformed(reason: impl Into<String>) -> EntityError {
    EntityError::MalformedMat { reason: reason.into() }
}

fn word(input: &[u8], endian: Endianness) -> Res<'_, u32> {
    num::u32(endian)(input)
}

fn bytes(input: &[u8], n: usize) -> Res<'_, &[u8]> {
    take(n)(input)
}

/// One tagged data element, normal or small format.
fn element(input: &[u8], endian: Endianness) -> Res<'_, Element<'_>> {
    let (input, first) = word(input, endian)?;
    let packed = (first >> 16) as usize;
    if packed != 0 {
        let (input, data) = bytes(input, 4)?;
        return Ok((input, Element { ty: first & 0xffff, data: &data[..packed.min(4)] }));
    }
    let (input, size) = word(input, endian)?;
    let size = size as usize;
    let (input, data) = bytes(input, size)?;
    // compressed elements are not padded; the last element of a file may not be
    let padding = if first == MI_COMPRESSED { 0 } else { (8 - size % 8) % 8 };
    let (input, _) = bytes(input, padding.min(input.len()))?;
    Ok((input, Element { ty: first, data }))
}

fn next_element(input: &[u8], endian: Endianness) -> EntityResult<(&[u8], Element<'_>)> {
    element(input, endian).map_err(|_| malformed("truncated data element"))
}

/// Content of an miMATRIX element: (array name, value).
fn matrix(data: &[u8], endian: Endianness) -> EntityResult<(String, MatValue)> {
    if data.is_empty() {
        return Ok((String::new(), MatValue::Empty));
    }
    let (rest, flags) = next_element(data, endian)?;
    let (_, flags) = word(flags.data, endian).map_err(|_| malformed("short array flags"))?;
    let class = flags & 0xff;
    let (rest, dims) = next_element(rest, endian)?;
    let dims: Vec<usize> = numbers(&dims, endian)?.into_iter().map(|d| d as usize).collect();
    let (mut rest, name) = next_element(rest, endian)?;
    let name = text(name.data);
    let count = dims
        .iter()
        .try_fold(1usize, |acc, d| acc.checked_mul(*d))
        .ok_or_else(|| malformed(format!("'{name}': dimensions {dims:?} overflow")))?;

    let value = match class {
        MX_CELL => {
            check_items(&name, count, rest)?;
            let mut items = Vec::new();
            for _ in 0..count {
                let (next, el) = next_element(rest, endian)?;
                items.push(matrix(el.data, endian)?.1);
                rest = next;
            }
            MatValue::Cell { dims, items }
        }
        MX_STRUCT => {
            let (next, len) = next_element(rest, endian)?;
            let name_len = numbers(&len, endian)?.first().copied().unwrap_or(0.0) as usize;
            let (next, names) = next_element(next, endian)?;
            rest = next;
            let fields: Vec<String> = if name_len == 0 {
                Vec::new()
            } else {
                names.data.chunks(name_len).map(text).collect()
            };
            // a struct without fields carries no element data
            let count = if fields.is_empty() { 0 } else { count };
            let items = count
                .checked_mul(fields.len())
                .ok_or_else(|| malformed(format!("'{name}': dimensions {dims:?} overflow")))?;
            check_items(&name, items, rest)?;
            let mut elements = Vec::new();
            for _ in 0..count {
                let mut values = Vec::new();
                for _ in &fields {
                    let (next, el) = next_element(rest, endian)?;
                    values.push(matrix(el.data, endian)?.1);
                    rest = next;
                }
                elements.push(values);
            }
            MatValue::Struct { dims, fields, elements }
        }
        MX_CHAR => {
            let codes = if rest.is_empty() { Vec::new() } else { char_codes(&next_element(rest, endian)?.1, endian)? };
            MatValue::Char { rows: char_rows(&dims, &codes).ok_or_else(|| {
                malformed(format!("'{name}': {} chars do not fit dimensions {dims:?}", codes.len()))
            })? }
        }
        MX_DOUBLE..=MX_UINT64 => {
            let data = if rest.is_empty() { Vec::new() } else { numbers(&next_element(rest, endian)?.1, endian)? };
            MatValue::Numeric { dims, data }
        }
        other => {
            log::debug!("Skipping variable '{name}' of unsupported class {other}");
            MatValue::Unsupported { class: other }
        }
    };
    Ok((name, value))
}

/// Every item is an element of at least one 8-byte tag.
fn check_items(name: &str, items: usize, rest: &[u8]) -> EntityResult<()> {
    if items > rest.len() / 8 {
        return Err(malformed(format!("'{name}': {items} items declared in {} bytes", rest.len())));
    }
    Ok(())
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).trim_end_matches('\0').to_string()
}

fn numbers(el: &Element<'_>, endian: Endianness) -> EntityResult<Vec<f64>> {
    let data = el.data;
    let parsed: Res<'_, Vec<f64>> = match el.ty {
        MI_INT8 => many0(map(num::i8, f64::from))(data),
        MI_UINT8 | MI_UTF8 => many0(map(num::u8, f64::from))(data),
        MI_INT16 => many0(map(num::i16(endian), f64::from))(data),
        MI_UINT16 | MI_UTF16 => many0(map(num::u16(endian), f64::from))(data),
        MI_INT32 => many0(map(num::i32(endian), f64::from))(data),
        MI_UINT32 | MI_UTF32 => many0(map(num::u32(endian), f64::from))(data),
        MI_INT64 => many0(map(num::i64(endian), |v| v as f64))(data),
        MI_UINT64 => many0(map(num::u64(endian), |v| v as f64))(data),
        MI_SINGLE => many0(map(num::f32(endian), f64::from))(data),
        MI_DOUBLE => many0(num::f64(endian))(data),
        other => return Err(malformed(format!("data type {other} is not numeric"))),
    };
    parsed
        .map(|(_, values)| values)
        .map_err(|_| malformed("unreadable numeric data"))
}

fn char_codes(el: &Element<'_>, endian: Endianness) -> EntityResult<Vec<char>> {
    if el.ty == MI_UTF8 {
        return Ok(String::from_utf8_lossy(el.data).chars().collect());
    }
    Ok(numbers(el, endian)?
        .into_iter()
        .map(|c| char::from_u32(c as u32).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect())
}

/// Split column-major char data into trimmed rows. None if the codes do
/// not fill whole columns of `dims[0]` rows.
fn char_rows(dims: &[usize], codes: &[char]) -> Option<Vec<String>> {
    let n_rows = dims.first().copied().unwrap_or(0);
    if n_rows == 0 || codes.is_empty() {
        return Some(Vec::new());
    }
    if codes.len() % n_rows != 0 {
        return None;
    }
    let n_cols = codes.len() / n_rows;
    Some(
        (0..n_rows)
            .map(|r| {
                let row: String = (0..n_cols).map(|c| codes[r + c * n_rows]).collect();
                row.trim_end().to_string()
            })
            .collect(),
    )
}
