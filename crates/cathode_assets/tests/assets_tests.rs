//! Integration tests for cathode_assets

use cathode_assets::fixtures::*;
use cathode_assets::*;
use cathode_core::{load_bytes, RawBlob};
use glam::Vec4;

#[test]
fn test_texture_table_decode() {
    let bytes = encode_textures(&[
        texture("FLOOR_DIFFUSE", 2, (1, 1), vec![1, 2, 3, 4], vec![]),
        texture("SKY_HIGH_MISSING", 6, (8, 8), vec![], vec![0; 8]),
    ]);
    let table: TextureTable = load_bytes(&bytes).expect("decode");
    assert_eq!(table.len(), 2);

    let sky = table.get(1).expect("entry").decode().expect("low res");
    assert!(sky.low_res);
    assert_eq!((sky.width, sky.height), (4, 4));
    assert!(table.get(2).is_none());
}

#[test]
fn test_material_parameter_offset() {
    let mut m = material("Panel", 0);
    m.constant_buffers[0].offset = 2;

    let mut cst_links: [Vec<u8>; 5] = Default::default();
    // Diffuse0 is environment slot 3
    cst_links[0] = vec![255, 255, 255, 1];
    let entry = shader(ShaderCategory::CA_ENVIRONMENT, vec![], cst_links);

    let materials: MaterialTable = load_bytes(&encode_materials(&[m], [0, 64, 64, 64, 64])).expect("mtl");
    let shaders: ShaderTable = load_bytes(&encode_shaders(&[entry])).expect("shaders");
    let remap: IdxRemap = load_bytes(&encode_remap(&[0])).expect("remap");

    let floats: Vec<u8> = (0..16).flat_map(|i| (i as f32).to_le_bytes()).collect();
    let buffers = ConstantBuffers::split(ConstantBufferBlob(RawBlob(floats)), materials.cst_offsets()).expect("split");

    let mat = materials.get_material_at_index(0).expect("material");
    let meta = shaders.classify_material(mat, &remap).expect("classify");
    let slot = meta.cst_index(ShaderParam::Diffuse0).expect("slot");
    let entry = shaders.shader_for_material(mat, &remap).expect("entry");

    let offset = entry.cst_byte_offset(mat, 0, slot).expect("valid");
    assert_eq!(offset, 2 * 4 + 1 * 4);
    let first = buffers.read_vec4(0, offset).expect("read");
    assert_eq!(first, Vec4::new(3.0, 4.0, 5.0, 6.0));
    assert_eq!(buffers.read_vec4(0, offset).expect("read"), first);
}
