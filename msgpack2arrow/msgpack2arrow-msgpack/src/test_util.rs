//! Minimal MessagePack encoders for building test inputs by hand.
//!
//! Each function returns the encoded bytes of one value; containers take
//! already-encoded children. Enabled by the `test-util` feature.

pub fn nil() -> Vec<u8> {
    vec![0xc0]
}

pub fn boolean(v: bool) -> Vec<u8> {
    vec![if v { 0xc3 } else { 0xc2 }]
}

pub fn uint(v: u64) -> Vec<u8> {
    match v {
        0..=0x7f => vec![v as u8],
        0x80..=0xff => vec![0xcc, v as u8],
        0x100..=0xffff => {
            let mut out = vec![0xcd];
            out.extend_from_slice(&(v as u16).to_be_bytes());
            out
        }
        0x1_0000..=0xffff_ffff => {
            let mut out = vec![0xce];
            out.extend_from_slice(&(v as u32).to_be_bytes());
            out
        }
        _ => {
            let mut out = vec![0xcf];
            out.extend_from_slice(&v.to_be_bytes());
            out
        }
    }
}

pub fn int(v: i64) -> Vec<u8> {
    if v >= 0 {
        return uint(v as u64);
    }
    if v >= -32 {
        return vec![v as i8 as u8];
    }
    let mut out = vec![0xd3];
    out.extend_from_slice(&v.to_be_bytes());
    out
}

pub fn float(v: f64) -> Vec<u8> {
    let mut out = vec![0xcb];
    out.extend_from_slice(&v.to_bits().to_be_bytes());
    out
}

pub fn float32(v: f32) -> Vec<u8> {
    let mut out = vec![0xca];
    out.extend_from_slice(&v.to_bits().to_be_bytes());
    out
}

pub fn string(s: &str) -> Vec<u8> {
    let len = s.len();
    let mut out = if len < 32 {
        vec![0xa0 | len as u8]
    } else if len <= 0xff {
        vec![0xd9, len as u8]
    } else {
        let mut h = vec![0xda];
        h.extend_from_slice(&(len as u16).to_be_bytes());
        h
    };
    out.extend_from_slice(s.as_bytes());
    out
}

pub fn binary(b: &[u8]) -> Vec<u8> {
    let mut out = vec![0xc4, b.len() as u8];
    out.extend_from_slice(b);
    out
}

pub fn array(items: Vec<Vec<u8>>) -> Vec<u8> {
    let len = items.len();
    let mut out = if len < 16 {
        vec![0x90 | len as u8]
    } else {
        let mut h = vec![0xdc];
        h.extend_from_slice(&(len as u16).to_be_bytes());
        h
    };
    for item in items {
        out.extend(item);
    }
    out
}

pub fn map(entries: Vec<(&str, Vec<u8>)>) -> Vec<u8> {
    let len = entries.len();
    let mut out = if len < 16 {
        vec![0x80 | len as u8]
    } else {
        let mut h = vec![0xde];
        h.extend_from_slice(&(len as u16).to_be_bytes());
        h
    };
    for (k, v) in entries {
        out.extend(string(k));
        out.extend(v);
    }
    out
}

/// Concatenate encoded top-level values into one stream.
pub fn stream(values: Vec<Vec<u8>>) -> Vec<u8> {
    values.concat()
}

/// `depth` arrays nested inside each other around a single integer.
pub fn nested_arrays(depth: usize) -> Vec<u8> {
    let mut out = vec![0x90 | 1; depth];
    out.push(0x01);
    out
}
