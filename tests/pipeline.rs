//! End to end runs of the public API against an in-memory image server.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    thread,
    time::{Duration, Instant},
};

use image::{codecs::gif::GifDecoder, AnimationDecoder, Delay, Frame, Rgba, RgbaImage};
use tempdir::TempDir;

use ridge_loop::{
    join_url, Config, Pipeline, Poller, RadarLoopErr, Station, Transport, DEFAULT_WINDOW_MINUTES,
};

struct Server {
    files: HashMap<String, Vec<u8>>,
    hits: Mutex<Vec<String>>,
}

impl Transport for Server {
    fn get(&self, url: &str) -> Result<Vec<u8>, RadarLoopErr> {
        self.hits.lock().unwrap().push(url.to_owned());
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| RadarLoopErr::Transport(format!("no such file {}", url)))
    }
}

fn gif(shade: u8) -> Vec<u8> {
    let img = RgbaImage::from_pixel(10, 8, Rgba([shade, shade, shade, 255]));
    let mut buf = vec![];
    {
        let mut enc = image::codecs::gif::GifEncoder::new(&mut buf);
        enc.encode_frame(Frame::from_parts(img, 0, 0, Delay::from_numer_denom_ms(0, 1)))
            .unwrap();
    }
    buf
}

// A listing for station MUX with frames every ten minutes from 21:00 to 22:30, plus noise.
fn server(config: &Config) -> (Server, Vec<String>) {
    let dir = config.station_dir_url();
    let names: Vec<String> = (0..10)
        .map(|i| {
            let minutes = 21 * 60 + i * 10;
            format!("MUX_20201214_{:02}{:02}_N0R.gif", minutes / 60, minutes % 60)
        })
        .collect();

    let mut html = String::from("<html><body><a href=\"../\">Parent</a>\n");
    for name in &names {
        html.push_str(&format!("<a href=\"{}\">{}</a>\n", name, name));
    }
    html.push_str("<a href=\"ATX_20201214_2230_N0R.gif\">other</a></body></html>");

    let mut files = HashMap::new();
    files.insert(dir.clone(), html.into_bytes());
    for (i, name) in names.iter().enumerate() {
        files.insert(join_url(&dir, name), gif(i as u8 * 25));
    }

    (
        Server {
            files,
            hits: Mutex::new(vec![]),
        },
        names,
    )
}

fn test_config() -> Config {
    Config {
        station: Station::new("mux").unwrap(),
        index_root: "http://ridge.test/RadarImg".to_owned(),
        fetch_workers: 3,
        ..Config::default()
    }
}

#[test]
fn one_shot_run_writes_window_in_order() {
    let config = test_config();
    let (server, names) = server(&config);
    let server = Arc::new(server);
    let pipeline = Pipeline::new(config, server.clone());

    let radar_loop = pipeline.run().unwrap();

    // 22:30 back 70 minutes is 21:20, so 21:00 and 21:10 fall outside.
    let kept: Vec<&str> = radar_loop
        .artifact
        .frames()
        .iter()
        .map(|f| f.raw_filename())
        .collect();
    let expected: Vec<&str> = names[2..].iter().map(String::as_str).collect();
    assert_eq!(kept, expected);
    assert_eq!(
        radar_loop.window.duration(),
        chrono::Duration::minutes(DEFAULT_WINDOW_MINUTES)
    );

    // Frame shades increase with time, so the decoded animation must too.
    let decoded = GifDecoder::new(radar_loop.artifact.as_bytes())
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap();
    assert_eq!(decoded.len(), expected.len());
    let shades: Vec<u8> = decoded.iter().map(|f| f.buffer().get_pixel(0, 0).0[0]).collect();
    assert!(shades.windows(2).all(|pair| pair[0] < pair[1]), "{:?}", shades);

    let tmp = TempDir::new("ridge-loop-integration").unwrap();
    let path = tmp.path().join("radar_anim.gif");
    radar_loop.artifact.write_to(&path).unwrap();
    assert!(std::fs::read(&path).unwrap().starts_with(b"GIF89a"));

    assert!(!server
        .hits
        .lock()
        .unwrap()
        .iter()
        .any(|url| url.contains("ATX_")));
}

#[test]
fn poller_produces_the_same_frames() {
    let config = test_config();
    let (server, _) = server(&config);
    let pipeline = Pipeline::new(config, Arc::new(server));

    let expected = pipeline.run().unwrap();

    let mut poller = Poller::new(pipeline);
    let mut produced = None;
    for _ in 0..2_000 {
        if let Some(radar_loop) = poller.tick(Instant::now()) {
            produced = Some(radar_loop);
            break;
        }
        thread::sleep(Duration::from_millis(5));
    }

    let produced = produced.expect("poller did not finish a cycle");
    assert_eq!(produced.artifact.frames(), expected.artifact.frames());
    assert_eq!(produced.window, expected.window);
}
