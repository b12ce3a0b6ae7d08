use std::io::Cursor;

/// EXIF Orientation を読む（EXIFがない・タグがない場合は 1）
pub fn read_orientation(bytes: &[u8]) -> Result<u32, exif::Error> {
    let mut cursor = Cursor::new(bytes);
    let exif_reader = exif::Reader::new();
    let exif = match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => return Ok(1),
        Err(e) => return Err(e),
    };

    let orientation = exif
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(1);

    Ok(orientation)
}
