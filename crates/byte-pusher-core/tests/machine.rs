use byte_pusher_core::machine::{
    BytePusher, DEFAULT_AUDIO_CAPACITY, INSTRUCTIONS_PER_FRAME, KEY_STATE_ADDR,
};
use byte_pusher_core::memory::ADDR_SPACE_SIZE;

fn set_u24(image: &mut [u8], addr: usize, value: u32) {
    image[addr] = (value >> 16) as u8;
    image[addr + 1] = (value >> 8) as u8;
    image[addr + 2] = value as u8;
}

/// Program whose only instruction copies `memory[0x200]` to `0x201` and
/// loops. Keeps the low pages (key state, PC field, page selectors) stable
/// while frames run.
fn idle_loop_image(len: usize) -> Vec<u8> {
    let mut image = vec![0u8; len];
    set_u24(&mut image, 2, 0x000100); // PC field
    set_u24(&mut image, 0x100, 0x000200);
    set_u24(&mut image, 0x103, 0x000201);
    set_u24(&mut image, 0x106, 0x000100);
    image
}

#[test]
fn load_then_idle_leaves_zero_padded_image() {
    let mut machine = BytePusher::new();
    machine.load_program(vec![0x11, 0x22, 0x33]);
    machine.run_instructions(0);

    assert_eq!(machine.memory.slice(0, 4), &[0x11, 0x22, 0x33, 0x00]);
    assert_eq!(machine.memory.read(0x12_3456), 0);
    assert_eq!(machine.frames(), 0);
}

#[test]
fn oversized_program_keeps_exactly_the_address_space_prefix() {
    let mut machine = BytePusher::new();
    let mut image = vec![0xAA; ADDR_SPACE_SIZE + 16];
    image[ADDR_SPACE_SIZE - 1] = 0xBB;
    machine.load_program(image);
    machine.run_instructions(0);

    assert_eq!(machine.memory.read(ADDR_SPACE_SIZE as u32 - 1), 0xBB);
    assert_eq!(machine.memory.slice(ADDR_SPACE_SIZE, 8), &[0u8; 8]);
}

#[test]
fn first_boundary_latches_keys_then_executes_one_instruction() {
    let mut machine = BytePusher::new();
    let mut image = idle_loop_image(0x400);
    image[0x200] = 0x7F;
    machine.load_program(image);
    machine.set_keys(0xBEEF);

    machine.run_instructions(1);

    assert_eq!(machine.frames(), 1);
    assert_eq!(machine.memory.read(KEY_STATE_ADDR), 0xBE);
    assert_eq!(machine.memory.read(KEY_STATE_ADDR + 1), 0xEF);
    // The single instruction ran with the freshly fetched PC.
    assert_eq!(machine.memory.read(0x201), 0x7F);
    assert_eq!(machine.cpu.pc, 0x000100);
}

#[test]
fn one_boundary_per_instruction_quota() {
    let mut machine = BytePusher::new();
    machine.load_program(idle_loop_image(0x400));

    machine.run_instructions(INSTRUCTIONS_PER_FRAME as u64);
    assert_eq!(machine.frames(), 1);

    machine.run_instructions(1);
    assert_eq!(machine.frames(), 2);

    machine.run_instructions(INSTRUCTIONS_PER_FRAME as u64 - 1);
    assert_eq!(machine.frames(), 2);

    machine.run_instructions(1);
    assert_eq!(machine.frames(), 3);
}

#[test]
fn extraction_reflects_the_previous_frames_memory() {
    let mut machine = BytePusher::new();
    // Pixel page 0x01; the looping instruction overwrites the first pixel
    // with raw value 5 (blue) during the first frame.
    let mut image = idle_loop_image(0x01_0001);
    image[5] = 0x01;
    image[0x01_0000] = 215; // white before any instruction runs
    image[0x200] = 5;
    set_u24(&mut image, 0x103, 0x01_0000);
    machine.load_program(image);

    machine.run_instructions(INSTRUCTIONS_PER_FRAME as u64);
    assert!(machine.take_frame_ready());
    // The first boundary extracted the pre-frame state, not the result of
    // the 65,536 instructions that followed it.
    assert_eq!(&machine.framebuffer()[0..4], &[255, 255, 255, 255]);

    machine.run_instructions(1);
    assert!(machine.take_frame_ready());
    assert_eq!(&machine.framebuffer()[0..4], &[0, 0, 255, 255]);
}

#[test]
fn audio_extraction_pushes_one_block_per_frame() {
    let mut machine = BytePusher::new();
    let mut image = idle_loop_image(0x02_0100);
    image[6] = 0x02;
    image[7] = 0x00; // sample page at 0x02_0000
    for i in 0..256 {
        image[0x02_0000 + i] = i as u8;
    }
    machine.load_program(image);
    let consumer = machine.enable_audio(DEFAULT_AUDIO_CAPACITY);

    machine.run_instructions(1);
    assert_eq!(consumer.len(), 256);
    assert_eq!(consumer.pop(), Some(0));
    assert_eq!(consumer.pop(), Some(1));
    for _ in 2..128 {
        consumer.pop();
    }
    // Raw bytes are reinterpreted as two's-complement samples.
    assert_eq!(consumer.pop(), Some(-128));
    while consumer.pop().is_some() {}

    machine.run_instructions(INSTRUCTIONS_PER_FRAME as u64);
    assert_eq!(consumer.len(), 256);
}

#[test]
fn machine_without_audio_sink_still_produces_video() {
    let mut machine = BytePusher::new();
    machine.load_program(idle_loop_image(0x400));
    machine.run_instructions(INSTRUCTIONS_PER_FRAME as u64);
    assert_eq!(machine.frames(), 1);
    assert!(machine.take_frame_ready());
}

#[test]
fn paused_ticks_change_nothing() {
    let mut machine = BytePusher::new();
    machine.load_program(idle_loop_image(0x400));
    machine.set_paused(true);

    for _ in 0..10 {
        machine.tick(16.0);
    }

    assert_eq!(machine.frames(), 0);
    assert_eq!(machine.cpu.pc, 0);
    // The pending image stays pending: memory is untouched while paused.
    assert_eq!(machine.memory.read(0x101), 0);

    machine.set_paused(false);
    machine.tick(16.0);
    assert!(machine.frames() > 0);
    assert_eq!(machine.memory.read(0x101), 0x02);
}

#[test]
fn tick_paces_instructions_by_wall_clock() {
    let mut machine = BytePusher::new();
    // 50 ms at speed 1.0 is exactly three frame quotas.
    machine.tick(25.0);
    machine.tick(25.0);
    assert_eq!(machine.frames(), 3);
}

#[test]
fn speed_multiplier_scales_throughput() {
    let mut machine = BytePusher::new();
    machine.set_speed(2.0);
    machine.tick(25.0);
    machine.tick(25.0);
    assert_eq!(machine.frames(), 6);
}

#[test]
fn reload_resets_the_quota_counter() {
    let mut machine = BytePusher::new();
    machine.load_program(idle_loop_image(0x400));
    // Stop mid-frame, then load a new program.
    machine.run_instructions(INSTRUCTIONS_PER_FRAME as u64 / 2);
    assert_eq!(machine.frames(), 1);

    machine.load_program(idle_loop_image(0x400));
    machine.run_instructions(1);
    // The fresh program starts with an immediate boundary phase.
    assert_eq!(machine.frames(), 2);
}
