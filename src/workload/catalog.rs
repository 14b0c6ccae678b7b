//! Workload catalog
//!
//! The literal per-workload manifests: GPU tier, naming, extra
//! packages, custom nodes, and every model artifact with its place in
//! the ComfyUI model tree.

use crate::tokens::{CIVITAI_TOKEN, HF_TOKEN};
use crate::workload::profile::{ModelSource, WorkloadProfile};
use crate::workload::{GpuTier, Workload};

/// Get the profile for a workload
pub fn profile(workload: Workload) -> WorkloadProfile {
    match workload {
        Workload::AceStep => ace_step(),
        Workload::Flux => flux(),
        Workload::Krita => krita(),
        Workload::Qwen => qwen(),
        Workload::Wan => wan(),
    }
}

fn hf(repo: &'static str, file: &'static str, dest: &'static str) -> ModelSource {
    ModelSource::HfFile {
        repo,
        file,
        dest,
        save_as: None,
        token: None,
    }
}

fn hf_as(
    repo: &'static str,
    file: &'static str,
    dest: &'static str,
    save_as: &'static str,
) -> ModelSource {
    ModelSource::HfFile {
        repo,
        file,
        dest,
        save_as: Some(save_as),
        token: None,
    }
}

/// Audio generation: ACE-Step v1 plus Qwen3-14B for lyrics
fn ace_step() -> WorkloadProfile {
    const QWEN3_DIR: &str = "Qwen/Qwen/Qwen3-14B";

    let mut models = vec![ModelSource::HfSnapshot {
        repo: "ACE-Step/ACE-Step-v1-3.5B",
        link_name: "ACE-Step-v1-3.5B",
        dest: "TTS",
        allow: &["*.json", "*.safetensors"],
        ignore: &[],
    }];

    const QWEN3_REPO: &str = "Qwen/Qwen3-14B";
    const QWEN3_FILES: &[&str] = &[
        "model-00001-of-00008.safetensors",
        "model-00002-of-00008.safetensors",
        "model-00003-of-00008.safetensors",
        "model-00004-of-00008.safetensors",
        "model-00005-of-00008.safetensors",
        "model-00006-of-00008.safetensors",
        "model-00007-of-00008.safetensors",
        "model-00008-of-00008.safetensors",
        "config.json",
        "tokenizer.json",
        "vocab.json",
        "merges.txt",
        "generation_config.json",
        "tokenizer_config.json",
        "model.safetensors.index.json",
    ];
    models.extend(QWEN3_FILES.iter().map(|&f| hf(QWEN3_REPO, f, QWEN3_DIR)));

    WorkloadProfile {
        workload: Workload::AceStep,
        gpu: GpuTier::L40S,
        app_name: "ace-step-comfyui",
        output_volume: "ace-step-comfyui-output",
        // audiotools node needs a working audio stack
        system_packages: vec!["sox", "ffmpeg", "libportaudio2"],
        python_packages: vec!["sounddevice", "easydict", "torch-complex"],
        // audiotools needs this after all numpy installs; the last one
        // happens during the ACE-Step node install
        post_install: vec!["numpy==2.2"],
        nodes: vec!["ace-step", "audiotools", "ComfyUI-Qwen3"],
        models,
    }
}

/// Image generation: FLUX.1 schnell
fn flux() -> WorkloadProfile {
    WorkloadProfile {
        workload: Workload::Flux,
        gpu: GpuTier::T4,
        app_name: "flux-comfyui",
        output_volume: "flux-comfyui-output",
        system_packages: vec![],
        python_packages: vec![],
        post_install: vec![],
        nodes: vec![],
        models: vec![
            hf(
                "comfyanonymous/flux_text_encoders",
                "t5xxl_fp8_e4m3fn_scaled.safetensors",
                "text_encoders",
            ),
            hf(
                "comfyanonymous/flux_text_encoders",
                "clip_l.safetensors",
                "text_encoders",
            ),
            hf_as(
                "Comfy-Org/Lumina_Image_2.0_Repackaged",
                "split_files/vae/ae.safetensors",
                "vae",
                "ae.safetensors",
            ),
            // gated repository
            ModelSource::HfFile {
                repo: "black-forest-labs/FLUX.1-schnell",
                file: "flux1-schnell.safetensors",
                dest: "unet",
                save_as: None,
                token: Some(HF_TOKEN),
            },
        ],
    }
}

/// Backend for the Krita generative-AI plugin
fn krita() -> WorkloadProfile {
    let mut models = vec![
        hf(
            "OnomaAIResearch/Illustrious-XL-v2.0",
            "Illustrious-XL-v2.0.safetensors",
            "checkpoints",
        ),
        hf_as(
            "h94/IP-Adapter",
            "models/image_encoder/model.safetensors",
            "clip_vision",
            "clip-vision_vit-h.safetensors",
        ),
    ];

    // upscalers
    models.push(ModelSource::Url {
        url: "https://objectstorage.us-phoenix-1.oraclecloud.com/n/ax6ygfvpvzka/b/open-modeldb-files/o/4x-NMKD-YandereNeo.pth",
        file: "4x-NMKD-YandereNeo.pth",
        dest: "upscale_models",
        token_query: None,
    });
    models.extend([
        hf("Acly/Omni-SR", "OmniSR_X2_DIV2K.safetensors", "upscale_models"),
        hf("Acly/Omni-SR", "OmniSR_X3_DIV2K.safetensors", "upscale_models"),
        hf("Acly/Omni-SR", "OmniSR_X4_DIV2K.safetensors", "upscale_models"),
        hf("Acly/hat", "HAT_SRx4_ImageNet-pretrain.pth", "upscale_models"),
        hf("Acly/hat", "Real_HAT_GAN_sharper.pth", "upscale_models"),
    ]);

    // inpainting checkpoint from Civitai
    models.push(ModelSource::Url {
        url: "https://civitai.com/api/download/models/480117?type=Model&format=SafeTensor&size=pruned&fp=fp16",
        file: "animaginexl_v31Inpainting.safetensors",
        dest: "inpaint",
        token_query: Some(("token", CIVITAI_TOKEN)),
    });

    // controlnets; most repos ship the generic diffusers filename, so
    // the links carry the repo-specific name instead
    models.extend([
        hf_as(
            "Eugeoter/noob-sdxl-controlnet-scribble_pidinet",
            "diffusion_pytorch_model.fp16.safetensors",
            "controlnet",
            "noob-sdxl-controlnet-scribble_pidinet.fp16.safetensors",
        ),
        hf_as(
            "Eugeoter/noob-sdxl-controlnet-lineart_anime",
            "diffusion_pytorch_model.fp16.safetensors",
            "controlnet",
            "noob-sdxl-controlnet-lineart_anime.fp16.safetensors",
        ),
        hf_as(
            "Eugeoter/noob-sdxl-controlnet-softedge_hed",
            "diffusion_pytorch_model.fp16.safetensors",
            "controlnet",
            "noob-sdxl-controlnet-softedge_hed.fp16.safetensors",
        ),
        hf(
            "Eugeoter/noob-sdxl-controlnet-canny",
            "noob_sdxl_controlnet_canny.fp16.safetensors",
            "controlnet",
        ),
        hf_as(
            "Eugeoter/noob-sdxl-controlnet-depth_midas-v1-1",
            "diffusion_pytorch_model.fp16.safetensors",
            "controlnet",
            "noob-sdxl-controlnet-depth_midas-v1-1.fp16.safetensors",
        ),
        hf_as(
            "Eugeoter/noob-sdxl-controlnet-normal",
            "diffusion_pytorch_model.fp16.safetensors",
            "controlnet",
            "noob-sdxl-controlnet-normal.fp16.safetensors",
        ),
        hf(
            "windsingai/Illustrious-XL-openpose-test",
            "openpose_s6000.safetensors",
            "controlnet",
        ),
        hf_as(
            "Eugeoter/noob-sdxl-controlnet-tile",
            "diffusion_pytorch_model.fp16.safetensors",
            "controlnet",
            "noob-sdxl-controlnet-tile.fp16.safetensors",
        ),
    ]);

    // ip-adapter weights plus its ViT-G image encoder
    models.extend([
        hf_as(
            "h94/IP-Adapter",
            "sdxl_models/image_encoder/model.safetensors",
            "clip_vision",
            "clip-vision_vit-g.safetensors",
        ),
        hf(
            "kataragi/Noob_ipadapter",
            "ip_adapter_Noobtest_800000.bin",
            "ipadapter",
        ),
    ]);

    WorkloadProfile {
        workload: Workload::Krita,
        gpu: GpuTier::T4,
        app_name: "krita-comfyui",
        output_volume: "krita-comfyui-output",
        // controlnet preprocessors link against GL
        system_packages: vec!["libgl1", "libglib2.0-0"],
        python_packages: vec![],
        post_install: vec![],
        nodes: vec![
            "comfyui_controlnet_aux",
            "comfyui_ipadapter_plus",
            "comfyui-inpaint-nodes",
            "comfyui-tooling-nodes",
        ],
        models,
    }
}

/// Vision-language inference: Qwen2.5-VL 32B
fn qwen() -> WorkloadProfile {
    const QWEN_VL_REPO: &str = "Qwen/Qwen2.5-VL-32B-Instruct";
    const QWEN_VL_DIR: &str = "Qwen/Qwen-VL/Qwen2.5-VL-32B-Instruct";
    const QWEN_VL_FILES: &[&str] = &[
        "model-00001-of-00018.safetensors",
        "model-00002-of-00018.safetensors",
        "model-00003-of-00018.safetensors",
        "model-00004-of-00018.safetensors",
        "model-00005-of-00018.safetensors",
        "model-00006-of-00018.safetensors",
        "model-00007-of-00018.safetensors",
        "model-00008-of-00018.safetensors",
        "model-00009-of-00018.safetensors",
        "model-00010-of-00018.safetensors",
        "model-00011-of-00018.safetensors",
        "model-00012-of-00018.safetensors",
        "model-00013-of-00018.safetensors",
        "model-00014-of-00018.safetensors",
        "model-00015-of-00018.safetensors",
        "model-00016-of-00018.safetensors",
        "model-00017-of-00018.safetensors",
        "model-00018-of-00018.safetensors",
        "config.json",
        "tokenizer.json",
        "vocab.json",
        "merges.txt",
        "chat_template.json",
        "preprocessor_config.json",
        "generation_config.json",
        "tokenizer_config.json",
        "model.safetensors.index.json",
    ];

    WorkloadProfile {
        workload: Workload::Qwen,
        gpu: GpuTier::A100_80,
        app_name: "qwen-comfyui",
        output_volume: "qwen-comfyui-output",
        system_packages: vec![],
        python_packages: vec![],
        post_install: vec![],
        nodes: vec!["ComfyUI-Qwen-VL", "comfyui-custom-scripts"],
        models: QWEN_VL_FILES
            .iter()
            .map(|&f| hf(QWEN_VL_REPO, f, QWEN_VL_DIR))
            .collect(),
    }
}

/// Image-to-video live wallpapers: Wan 2.1 14B
fn wan() -> WorkloadProfile {
    const WAN_REPO: &str = "Comfy-Org/Wan_2.1_ComfyUI_repackaged";

    WorkloadProfile {
        workload: Workload::Wan,
        gpu: GpuTier::L40S,
        app_name: "wan-comfyui",
        output_volume: "wan-comfyui-output",
        system_packages: vec![],
        python_packages: vec![],
        post_install: vec![],
        nodes: vec!["ComfyUI-GGUF", "ComfyUI-WanStartEndFramesNative"],
        models: vec![
            hf_as(
                WAN_REPO,
                "split_files/text_encoders/umt5_xxl_fp8_e4m3fn_scaled.safetensors",
                "text_encoders",
                "umt5_xxl_fp8_e4m3fn_scaled.safetensors",
            ),
            hf_as(
                WAN_REPO,
                "split_files/vae/wan_2.1_vae.safetensors",
                "vae",
                "wan_2.1_vae.safetensors",
            ),
            hf_as(
                WAN_REPO,
                "split_files/clip_vision/clip_vision_h.safetensors",
                "clip_vision",
                "clip_vision_h.safetensors",
            ),
            ModelSource::Url {
                url: "https://civitai.com/api/download/models/1873761?type=Model&format=GGUF&size=full&fp=fp32",
                file: "liveWallpaperFast_i2v14B720P.gguf",
                dest: "diffusion_models",
                token_query: Some(("token", CIVITAI_TOKEN)),
            },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_workload_has_a_profile() {
        for w in Workload::all() {
            let p = profile(*w);
            assert_eq!(p.workload, *w);
            assert!(!p.models.is_empty(), "{} has no models", w);
        }
    }

    #[test]
    fn app_and_volume_names_unique() {
        let mut apps = HashSet::new();
        let mut volumes = HashSet::new();
        let mut tuples = HashSet::new();

        for w in Workload::all() {
            let p = profile(*w);
            assert!(apps.insert(p.app_name), "duplicate app name {}", p.app_name);
            assert!(
                volumes.insert(p.output_volume),
                "duplicate volume {}",
                p.output_volume
            );
            assert!(tuples.insert((p.gpu.to_string(), p.app_name, p.output_volume)));
        }
    }

    #[test]
    fn output_volume_derives_from_app_name() {
        for w in Workload::all() {
            let p = profile(*w);
            assert_eq!(p.output_volume, format!("{}-output", p.app_name));
        }
    }

    #[test]
    fn gated_sources_declare_their_token() {
        let flux = profile(Workload::Flux);
        let gated: Vec<_> = flux
            .models
            .iter()
            .filter(|m| matches!(m, ModelSource::HfFile { token: Some(_), .. }))
            .collect();
        assert_eq!(gated.len(), 1);
        assert!(gated[0].describe().contains("FLUX.1-schnell"));
    }

    #[test]
    fn wan_manifest_layout() {
        let wan = profile(Workload::Wan);
        assert_eq!(wan.models_for("diffusion_models").len(), 1);
        assert_eq!(wan.models_for("text_encoders").len(), 1);
        assert_eq!(wan.models_for("vae").len(), 1);
        assert_eq!(wan.models_for("clip_vision").len(), 1);
    }

    #[test]
    fn qwen_manifest_counts() {
        let qwen = profile(Workload::Qwen);
        assert_eq!(qwen.models.len(), 27);
        // everything lands in the nested vendor directory
        assert!(qwen
            .models
            .iter()
            .all(|m| m.dest() == "Qwen/Qwen-VL/Qwen2.5-VL-32B-Instruct"));
    }

    #[test]
    fn krita_controlnet_links_are_distinct() {
        let krita = profile(Workload::Krita);
        let controlnets = krita.models_for("controlnet");
        assert_eq!(controlnets.len(), 8);

        let names: HashSet<_> = controlnets.iter().map(|m| m.link_name()).collect();
        assert_eq!(names.len(), 8, "controlnet link names must not collide");
    }

    #[test]
    fn civitai_sources_require_token() {
        for w in [Workload::Krita, Workload::Wan] {
            let p = profile(w);
            let civitai: Vec<_> = p
                .models
                .iter()
                .filter(|m| matches!(m, ModelSource::Url { token_query: Some(_), .. }))
                .collect();
            assert_eq!(civitai.len(), 1, "{} should have one civitai source", w);
        }
    }
}
