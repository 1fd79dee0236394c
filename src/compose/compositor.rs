//! Dispatcher-side render post-processor (§4.4 "Render" post-processor).

use image::{ImageBuffer, Rgba, RgbaImage};
use thiserror::Error;

use super::tiling::RenderFragmentPayload;

/// Failures compositing one fragment into the final image.
#[derive(Debug, Error)]
pub enum CompositeError {
    /// The task's result/payload did not contain a well-formed
    /// [`RenderFragmentPayload`].
    #[error("render fragment payload is malformed: {0}")]
    MalformedPayload(#[from] serde_json::Error),
    /// Reading, creating, or saving an image file failed.
    #[error("image I/O for {path}: {source}")]
    Image {
        /// Path of the offending file.
        path: String,
        /// Underlying decode/encode error.
        #[source]
        source: image::ImageError,
    },
    /// Deleting the fragment file after compositing failed.
    #[error("failed to delete fragment file {path}: {source}")]
    Cleanup {
        /// Path of the fragment file.
        path: String,
        #[source]
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Composite one completed fragment into the final image, creating the
/// final image if it doesn't exist yet, then delete the fragment file.
///
/// The renderer emits fragments top-left-origin; the final canvas is
/// addressed bottom-left-origin (§4.4), so each fragment row is flipped
/// using the configured image height before it's written into the canvas.
pub fn composite_fragment(payload_json: &str) -> Result<(), CompositeError> {
    let payload: RenderFragmentPayload = serde_json::from_str(payload_json)?;

    let mut canvas: RgbaImage = match image::open(&payload.output_file_name) {
        Ok(img) => img.to_rgba8(),
        Err(_) => ImageBuffer::new(payload.image_width, payload.image_height),
    };

    let fragment = image::open(&payload.fragment_output).map_err(|source| CompositeError::Image {
        path: payload.fragment_output.clone(),
        source,
    })?;
    let fragment = fragment.to_rgba8();

    for local_y in 0..payload.frag_h {
        for local_x in 0..payload.frag_w {
            let pixel: &Rgba<u8> = fragment.get_pixel(local_x, local_y);
            let renderer_row = payload.frag_y - 1 + local_y;
            let dest_row = payload.image_height - 1 - renderer_row;
            let dest_col = payload.frag_x - 1 + local_x;
            if dest_col < payload.image_width && dest_row < payload.image_height {
                canvas.put_pixel(dest_col, dest_row, *pixel);
            }
        }
    }

    canvas
        .save(&payload.output_file_name)
        .map_err(|source| CompositeError::Image {
            path: payload.output_file_name.clone(),
            source,
        })?;

    std::fs::remove_file(&payload.fragment_output).map_err(|source| CompositeError::Cleanup {
        path: payload.fragment_output.clone(),
        source,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba as PixelRgba;

    #[test]
    fn composites_a_single_fragment_into_a_fresh_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let out_path = dir.path().join("final.png");
        let frag_path = dir.path().join("frag0.png");

        let mut frag_img: RgbaImage = ImageBuffer::new(10, 10);
        for y in 0..10 {
            for x in 0..10 {
                frag_img.put_pixel(x, y, PixelRgba([255, 0, 0, 255]));
            }
        }
        frag_img.save(&frag_path).unwrap();

        let payload = RenderFragmentPayload {
            ini: "unused.ini".into(),
            parent_id: 1,
            frag_x: 1,
            frag_y: 1,
            frag_w: 10,
            frag_h: 10,
            image_width: 20,
            image_height: 20,
            output_file_name: out_path.to_str().unwrap().to_string(),
            fragment_output: frag_path.to_str().unwrap().to_string(),
        };
        let payload_json = serde_json::to_string(&payload).unwrap();

        composite_fragment(&payload_json).unwrap();

        assert!(out_path.exists());
        assert!(!frag_path.exists());

        let final_img = image::open(&out_path).unwrap().to_rgba8();
        // frag_y=1 is the top row in renderer coordinates, which flips to
        // the bottom of the canvas (rows 10..20).
        assert_eq!(*final_img.get_pixel(0, 19), PixelRgba([255, 0, 0, 255]));
        assert_eq!(*final_img.get_pixel(0, 0), PixelRgba([0, 0, 0, 0]));
    }
}
