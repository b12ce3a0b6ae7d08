//! 向き補正（ファイルI/Oを含まない純粋関数）

use image::DynamicImage;

/// EXIF Orientation から必要な回転
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// 回転なし（1、および未対応の値）
    Normal,
    /// 3: 180°
    Rotate180,
    /// 6: 時計回りに90°
    Rotate90Cw,
    /// 8: 反時計回りに90°
    Rotate90Ccw,
}

impl Orientation {
    pub fn from_exif(value: u32) -> Self {
        match value {
            3 => Orientation::Rotate180,
            6 => Orientation::Rotate90Cw,
            8 => Orientation::Rotate90Ccw,
            _ => Orientation::Normal,
        }
    }
}

/// 画像を正しい向きに回転（切り取りなし）
pub fn correct_orientation(image: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => image,
        Orientation::Rotate180 => image.rotate180(),
        Orientation::Rotate90Cw => image.rotate90(),
        Orientation::Rotate90Ccw => image.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    const MARK: Rgb<u8> = Rgb([255, 0, 0]);

    /// 4x2、左上だけ赤
    fn marked_image() -> DynamicImage {
        let mut img = RgbImage::from_pixel(4, 2, Rgb([0, 0, 0]));
        img.put_pixel(0, 0, MARK);
        DynamicImage::ImageRgb8(img)
    }

    fn is_marked(image: &DynamicImage, x: u32, y: u32) -> bool {
        image.to_rgb8().get_pixel(x, y) == &MARK
    }

    #[test]
    fn test_from_exif() {
        assert_eq!(Orientation::from_exif(1), Orientation::Normal);
        assert_eq!(Orientation::from_exif(3), Orientation::Rotate180);
        assert_eq!(Orientation::from_exif(6), Orientation::Rotate90Cw);
        assert_eq!(Orientation::from_exif(8), Orientation::Rotate90Ccw);
        // 反転系（2,4,5,7）は補正しない
        assert_eq!(Orientation::from_exif(2), Orientation::Normal);
        assert_eq!(Orientation::from_exif(0), Orientation::Normal);
    }

    #[test]
    fn test_normal_is_noop() {
        let out = correct_orientation(marked_image(), Orientation::Normal);
        assert_eq!(out.dimensions(), (4, 2));
        assert!(is_marked(&out, 0, 0));
    }

    #[test]
    fn test_rotate180() {
        let out = correct_orientation(marked_image(), Orientation::Rotate180);
        assert_eq!(out.dimensions(), (4, 2));
        assert!(is_marked(&out, 3, 1));
    }

    #[test]
    fn test_rotate90_clockwise_swaps_dimensions() {
        let out = correct_orientation(marked_image(), Orientation::Rotate90Cw);
        assert_eq!(out.dimensions(), (2, 4));
        // 左上 → 右上
        assert!(is_marked(&out, 1, 0));
    }

    #[test]
    fn test_rotate90_counter_clockwise_swaps_dimensions() {
        let out = correct_orientation(marked_image(), Orientation::Rotate90Ccw);
        assert_eq!(out.dimensions(), (2, 4));
        // 左上 → 左下
        assert!(is_marked(&out, 0, 3));
    }
}
