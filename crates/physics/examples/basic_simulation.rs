use coldet_physics::{
    coldet_terrain::TerrainParams, create_sphere_collider, glam::Vec3, BodyBuilder, PhysicsWorld,
    SpawnConfig, WorldConfig,
};

fn main() {
    println!("=== Basic Physics Simulation ===\n");

    // Flat terrain, no random bodies
    let config = WorldConfig {
        reset_interval: 0.0,
        terrain: TerrainParams {
            grid_size: 17,
            grid_scale: 100.0,
            amplitude: 0.0,
            ..TerrainParams::default()
        },
        spawning: SpawnConfig {
            box_count: 0,
            sphere_count: 0,
            ..SpawnConfig::default()
        },
        ..WorldConfig::default()
    };
    let mut world = match PhysicsWorld::new(config) {
        Ok(world) => world,
        Err(err) => {
            eprintln!("Failed to create world: {err}");
            return;
        }
    };
    println!("Created physics world with gravity: {:?}", world.gravity());

    // Create falling ball (dynamic)
    let ball = match create_sphere_collider(1.0)
        .and_then(|shape| BodyBuilder::dynamic(shape, 1.0).position(Vec3::new(0.0, 10.0, 0.0)).restitution(0.5).build())
    {
        Ok(body) => world.add_body(body),
        Err(err) => {
            eprintln!("Failed to create ball: {err}");
            return;
        }
    };
    println!("Created falling ball at y = 10.0\n");

    // Simulate for 5 seconds
    let dt = 1.0 / 60.0; // 60 FPS
    let total_time = 5.0;
    let steps = (total_time / dt) as usize;

    println!("Simulating for {} seconds ({} steps)...\n", total_time, steps);

    for i in 0..steps {
        world.advance(dt);

        // Print position every 30 frames (0.5 seconds)
        if i % 30 == 0 {
            if let Some(body) = world.body(ball) {
                let time = i as f32 * dt;
                let pos = body.position();
                let vel = body.linear_velocity();
                println!(
                    "Time: {:.2}s | Position: ({:.3}, {:.3}, {:.3}) | Velocity: ({:.3}, {:.3}, {:.3}) | awake: {}",
                    time, pos.x, pos.y, pos.z, vel.x, vel.y, vel.z, body.is_awake()
                );
            }
        }
    }

    let Some(body) = world.body(ball) else {
        println!("✗ Ball handle no longer valid");
        return;
    };
    let final_pos = body.position();
    println!("\nFinal position: ({:.3}, {:.3}, {:.3})", final_pos.x, final_pos.y, final_pos.z);

    if final_pos.y > 0.9 && final_pos.y < 1.1 {
        println!("✓ Ball came to rest on the terrain!");
    } else {
        println!("✗ Ball position unexpected");
    }
}
