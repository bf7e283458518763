use crate::document::model::{CompositeImage, DocumentModel, LayerBounds, LayerKind, LayerNode};
use crate::foundation::error::{ToonletterError, ToonletterResult};

/// Output container variant.
///
/// `Standard` carries the interchange format's usual dimension ceiling;
/// `Large` lifts it for oversized documents, mirroring the two on-disk
/// flavors of the format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum EncodeVariant {
    /// Regular container, dimensions up to 30 000 px.
    Standard,
    /// Large-document container, dimensions up to 300 000 px.
    Large,
}

impl EncodeVariant {
    /// Maximum width/height accepted by this variant.
    pub fn max_dimension(self) -> u32 {
        match self {
            Self::Standard => 30_000,
            Self::Large => 300_000,
        }
    }

    /// Variant for a file extension, if it names a layered container.
    pub fn for_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "lyr" => Some(Self::Standard),
            "lyrb" => Some(Self::Large),
            _ => None,
        }
    }
}

/// Decode/encode boundary over the layered container format.
///
/// Decode of malformed bytes must fail with a readable reason and no retries;
/// encode must accept any validated model, including one whose children carry
/// a synthesized export group.
pub trait LayeredCodec: Send + Sync {
    /// Decode a full document model from container bytes.
    fn decode(&self, bytes: &[u8]) -> ToonletterResult<DocumentModel>;

    /// Encode a document model into container bytes.
    fn encode(&self, model: &DocumentModel, variant: EncodeVariant) -> ToonletterResult<Vec<u8>>;
}

const MAGIC: &[u8; 4] = b"LYRD";
const VERSION: u16 = 1;
const KIND_RASTER: u8 = 0;
const KIND_GROUP: u8 = 1;
const MAX_DEPTH: usize = 64;

/// Concrete codec for the `.lyr`/`.lyrb` chunked little-endian container.
#[derive(Clone, Copy, Debug, Default)]
pub struct LyrCodec;

impl LayeredCodec for LyrCodec {
    #[tracing::instrument(skip(bytes), fields(len = bytes.len()))]
    fn decode(&self, bytes: &[u8]) -> ToonletterResult<DocumentModel> {
        let mut r = Reader::new(bytes);

        let magic = r.take(4, "magic")?;
        if magic != MAGIC {
            return Err(ToonletterError::decode(
                "not a layered document (bad magic)",
            ));
        }
        let version = r.u16("version")?;
        if version != VERSION {
            return Err(ToonletterError::decode(format!(
                "unsupported container version {version}"
            )));
        }
        let variant = match r.u8("variant")? {
            0 => EncodeVariant::Standard,
            1 => EncodeVariant::Large,
            v => {
                return Err(ToonletterError::decode(format!(
                    "unknown container variant {v}"
                )));
            }
        };

        let width = r.u32("width")?;
        let height = r.u32("height")?;
        if width == 0 || height == 0 {
            return Err(ToonletterError::decode("document dimensions are zero"));
        }
        if width > variant.max_dimension() || height > variant.max_dimension() {
            return Err(ToonletterError::decode(format!(
                "{width}x{height} exceeds the {} px ceiling of this variant",
                variant.max_dimension()
            )));
        }

        let composite_len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(4))
            .ok_or_else(|| {
                ToonletterError::decode(format!(
                    "{width}x{height} composite overflows the pixel buffer size"
                ))
            })?;
        let rgba8 = r.take(composite_len, "composite pixels")?.to_vec();

        let child_count = r.u32("layer count")? as usize;
        let mut children = Vec::with_capacity(child_count.min(1024));
        for _ in 0..child_count {
            children.push(read_node(&mut r, 0)?);
        }

        if !r.is_empty() {
            tracing::warn!(trailing = r.remaining(), "trailing bytes after layer tree");
        }

        let model = DocumentModel {
            width,
            height,
            composite: CompositeImage {
                width,
                height,
                rgba8,
            },
            children,
        };
        model.validate().map_err(|e| match e {
            ToonletterError::Validation(msg) => ToonletterError::Decode(msg),
            other => other,
        })?;
        Ok(model)
    }

    #[tracing::instrument(skip(self, model))]
    fn encode(&self, model: &DocumentModel, variant: EncodeVariant) -> ToonletterResult<Vec<u8>> {
        model
            .validate()
            .map_err(|e| ToonletterError::encode(e.to_string()))?;
        if model.width > variant.max_dimension() || model.height > variant.max_dimension() {
            return Err(ToonletterError::encode(format!(
                "{}x{} exceeds the {} px ceiling of this variant",
                model.width,
                model.height,
                variant.max_dimension()
            )));
        }

        let mut out = Vec::with_capacity(model.composite.rgba8.len() + 64);
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_le_bytes());
        out.push(match variant {
            EncodeVariant::Standard => 0,
            EncodeVariant::Large => 1,
        });
        out.extend_from_slice(&model.width.to_le_bytes());
        out.extend_from_slice(&model.height.to_le_bytes());
        out.extend_from_slice(&model.composite.rgba8);

        write_u32_len(&mut out, model.children.len(), "layer count")?;
        for child in &model.children {
            write_node(&mut out, child)?;
        }
        Ok(out)
    }
}

fn read_node(r: &mut Reader<'_>, depth: usize) -> ToonletterResult<LayerNode> {
    if depth > MAX_DEPTH {
        return Err(ToonletterError::decode("layer tree nested too deeply"));
    }

    let name_len = r.u32("layer name length")? as usize;
    let name_bytes = r.take(name_len, "layer name")?;
    let name = std::str::from_utf8(name_bytes)
        .map_err(|_| ToonletterError::decode("layer name is not valid UTF-8"))?
        .to_string();

    let bounds = LayerBounds {
        left: r.i32("layer left")?,
        top: r.i32("layer top")?,
        width: r.u32("layer width")?,
        height: r.u32("layer height")?,
    };

    match r.u8("layer kind")? {
        KIND_RASTER => {
            // Bounds come straight off the wire; the multiply must not trust
            // them.
            let len = bounds.raster_byte_len().ok_or_else(|| {
                ToonletterError::decode(format!(
                    "raster layer '{name}' bounds {}x{} overflow the pixel buffer size",
                    bounds.width, bounds.height
                ))
            })?;
            let rgba8 = r.take(len, "layer pixels")?.to_vec();
            Ok(LayerNode {
                name,
                bounds,
                kind: LayerKind::Raster { rgba8 },
            })
        }
        KIND_GROUP => {
            let child_count = r.u32("group child count")? as usize;
            let mut children = Vec::with_capacity(child_count.min(1024));
            for _ in 0..child_count {
                children.push(read_node(r, depth + 1)?);
            }
            Ok(LayerNode {
                name,
                bounds,
                kind: LayerKind::Group { children },
            })
        }
        k => Err(ToonletterError::decode(format!("unknown layer kind {k}"))),
    }
}

fn write_node(out: &mut Vec<u8>, node: &LayerNode) -> ToonletterResult<()> {
    write_u32_len(out, node.name.len(), "layer name length")?;
    out.extend_from_slice(node.name.as_bytes());
    out.extend_from_slice(&node.bounds.left.to_le_bytes());
    out.extend_from_slice(&node.bounds.top.to_le_bytes());
    out.extend_from_slice(&node.bounds.width.to_le_bytes());
    out.extend_from_slice(&node.bounds.height.to_le_bytes());

    match &node.kind {
        LayerKind::Raster { rgba8 } => {
            if node.bounds.raster_byte_len() != Some(rgba8.len()) {
                return Err(ToonletterError::encode(format!(
                    "raster layer '{}' byte length {} does not match its bounds",
                    node.name,
                    rgba8.len()
                )));
            }
            out.push(KIND_RASTER);
            out.extend_from_slice(rgba8);
        }
        LayerKind::Group { children } => {
            out.push(KIND_GROUP);
            write_u32_len(out, children.len(), "group child count")?;
            for child in children {
                write_node(out, child)?;
            }
        }
    }
    Ok(())
}

fn write_u32_len(out: &mut Vec<u8>, len: usize, what: &str) -> ToonletterResult<()> {
    let v: u32 = len
        .try_into()
        .map_err(|_| ToonletterError::encode(format!("{what} exceeds u32")))?;
    out.extend_from_slice(&v.to_le_bytes());
    Ok(())
}

/// Truncation-safe little-endian cursor over container bytes.
struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, n: usize, what: &str) -> ToonletterResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(ToonletterError::decode(format!(
                "truncated while reading {what} ({} of {n} bytes left)",
                self.remaining()
            )));
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u8(&mut self, what: &str) -> ToonletterResult<u8> {
        Ok(self.take(1, what)?[0])
    }

    fn u16(&mut self, what: &str) -> ToonletterResult<u16> {
        let b = self.take(2, what)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self, what: &str) -> ToonletterResult<u32> {
        let b = self.take(4, what)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn i32(&mut self, what: &str) -> ToonletterResult<i32> {
        let b = self.take(4, what)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/codec.rs"]
mod tests;
