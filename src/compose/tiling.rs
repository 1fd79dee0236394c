//! Fragment-rectangle computation and task emission (§4.3 "Render (split)").

use std::time::Duration;

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::core::error::TaskBuildError;
use crate::core::Task;

/// The JSON payload carried by one render fragment task, also re-read by
/// the dispatcher's post-processor once the worker's result comes back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderFragmentPayload {
    /// Path to the render-config file the worker re-parses for its own
    /// renderer invocation.
    pub ini: String,
    /// Parent logical job id (shared by every fragment of one split).
    pub parent_id: u64,
    /// 1-indexed, top-left-origin x of this fragment within the final image.
    pub frag_x: u32,
    /// 1-indexed, top-left-origin y of this fragment within the final image.
    pub frag_y: u32,
    /// Fragment width in pixels, clipped to the image's right edge.
    pub frag_w: u32,
    /// Fragment height in pixels, clipped to the image's bottom edge.
    pub frag_h: u32,
    /// Full image width, carried so the compositor need not re-open the ini.
    pub image_width: u32,
    /// Full image height, carried so the compositor need not re-open the ini.
    pub image_height: u32,
    /// Path the final composited image is written to.
    pub output_file_name: String,
    /// Path this fragment's own TGA output is written to by the renderer.
    pub fragment_output: String,
}

/// Clamp `width / nb_workers` (same formula is reused for both axes,
/// per §9 open question (b) — intentionally not `height / nb_workers`)
/// into `[size_min, size_max]`.
fn fragment_edge(width: u32, size_min: u32, size_max: u32, nb_workers: usize) -> u32 {
    let hint = width / (nb_workers.max(1) as u32).max(1);
    hint.clamp(size_min, size_max)
}

/// Build one [`Task`] per fragment of a render job: parse the render-config,
/// delete any stale output file, tile the image into fragments clamped to
/// `[size_min, size_max]` on both axes, then return the fragment tasks in
/// shuffled order (§4.3's load-balancing rationale).
pub fn build_render_tasks(
    ini: &str,
    size_min: u32,
    size_max: u32,
    parent_id: u64,
    max_wait: Duration,
    nb_workers: usize,
) -> Result<Vec<Task>, TaskBuildError> {
    let render_config = RenderConfig::load(ini)?;
    let _ = std::fs::remove_file(&render_config.output_file_name);

    let frag_edge = fragment_edge(render_config.width, size_min, size_max, nb_workers);
    let tiles_x = render_config.width.div_ceil(frag_edge);
    let tiles_y = render_config.height.div_ceil(frag_edge);

    let mut tasks = Vec::with_capacity((tiles_x * tiles_y) as usize);
    let mut sub_id = 0u64;
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let x0 = tx * frag_edge;
            let y0 = ty * frag_edge;
            let w = frag_edge.min(render_config.width - x0);
            let h = frag_edge.min(render_config.height - y0);

            let fragment_output = format!("{}.frag{sub_id}.tga", render_config.output_file_name);
            let payload = RenderFragmentPayload {
                ini: ini.to_string(),
                parent_id,
                frag_x: x0 + 1,
                frag_y: y0 + 1,
                frag_w: w,
                frag_h: h,
                image_width: render_config.width,
                image_height: render_config.height,
                output_file_name: render_config.output_file_name.clone(),
                fragment_output,
            };
            let payload_json =
                serde_json::to_string(&payload).expect("RenderFragmentPayload always serializes");
            tasks.push(Task::render_fragment(
                parent_id,
                sub_id,
                max_wait,
                payload_json,
            ));
            sub_id += 1;
        }
    }

    tasks.shuffle(&mut rand::rng());
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_fragment_edge_into_range() {
        assert_eq!(fragment_edge(1000, 50, 100, 1), 100);
        assert_eq!(fragment_edge(1000, 200, 500, 4), 250);
        assert_eq!(fragment_edge(10, 50, 100, 1), 50);
    }

    #[test]
    fn tiles_a_square_image_into_four_quadrants() {
        let dir = tempfile::tempdir().unwrap();
        let ini_path = dir.path().join("job.ini");
        let out_path = dir.path().join("out.tga");
        std::fs::write(
            &ini_path,
            format!(
                "Width=200\nHeight=200\nOutput_File_Name={}\n",
                out_path.display()
            ),
        )
        .unwrap();

        let tasks = build_render_tasks(
            ini_path.to_str().unwrap(),
            100,
            150,
            7,
            Duration::from_secs(5),
            1,
        )
        .unwrap();
        assert_eq!(tasks.len(), 4);

        let mut sub_ids: Vec<u64> = tasks.iter().map(|t| t.sub_id).collect();
        sub_ids.sort_unstable();
        assert_eq!(sub_ids, vec![0, 1, 2, 3]);
        assert!(tasks.iter().all(|t| t.id == 7));
    }

    #[test]
    fn clips_fragments_at_the_image_edge() {
        let dir = tempfile::tempdir().unwrap();
        let ini_path = dir.path().join("job.ini");
        let out_path = dir.path().join("out.tga");
        std::fs::write(
            &ini_path,
            format!(
                "Width=130\nHeight=130\nOutput_File_Name={}\n",
                out_path.display()
            ),
        )
        .unwrap();

        let tasks =
            build_render_tasks(ini_path.to_str().unwrap(), 100, 100, 1, Duration::from_secs(5), 1)
                .unwrap();
        let total_area: u64 = tasks
            .iter()
            .map(|t| {
                let p: RenderFragmentPayload = serde_json::from_str(&t.payload).unwrap();
                u64::from(p.frag_w) * u64::from(p.frag_h)
            })
            .sum();
        assert!(total_area >= 130 * 130);
    }
}
