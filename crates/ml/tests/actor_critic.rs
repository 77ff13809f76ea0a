use candle_core::{DType, Device, Tensor};
use candle_nn::{AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use ml::TinyActorCritic;

fn network(obs_dim: usize) -> (VarMap, TinyActorCritic) {
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
    let net = TinyActorCritic::new(vb, obs_dim, 1).unwrap();
    (varmap, net)
}

fn observation() -> Tensor {
    Tensor::new(&[[0.1f32, -0.2, 0.05, 0.3]], &Device::Cpu).unwrap()
}

#[test]
fn param_count_for_four_observations() {
    let (varmap, net) = network(4);
    // 4*32+32 + 32*32+32 + 32+1 + 1 + 32+1
    assert_eq!(net.param_count(), 1283);
    let registered: usize = varmap.all_vars().iter().map(|v| v.elem_count()).sum();
    assert_eq!(registered, net.param_count());
}

#[test]
fn forward_shapes() {
    let (_, net) = network(4);
    let heads = net.forward(&observation()).unwrap();
    assert_eq!(heads.mu.dims(), &[1, 1]);
    assert_eq!(heads.std.dims(), &[1]);
    assert_eq!(heads.value.dims(), &[1]);
}

#[test]
fn log_std_starts_at_zero() {
    let (_, net) = network(4);
    let heads = net.forward(&observation()).unwrap();
    let std = heads.std.to_vec1::<f32>().unwrap();
    assert!((std[0] - 1.0).abs() < 1e-6);
}

#[test]
fn act_produces_bounded_action_and_finite_log_prob() {
    let (_, net) = network(4);
    for _ in 0..20 {
        let out = net.act(&observation()).unwrap();
        let action = out.action.to_vec2::<f32>().unwrap()[0][0];
        let log_prob = out.log_prob.to_vec1::<f32>().unwrap();
        assert!(action > -1.0 && action < 1.0, "action {action}");
        assert_eq!(log_prob.len(), 1);
        assert!(log_prob[0].is_finite());
        assert_eq!(out.value.dims(), &[1]);
    }
}

#[test]
fn value_loss_gradients_are_finite_and_update_params() {
    let (varmap, net) = network(4);
    let mut opt = AdamW::new(
        varmap.all_vars(),
        ParamsAdamW {
            lr: 3e-4,
            weight_decay: 0.0,
            ..Default::default()
        },
    )
    .unwrap();

    let head_weight = {
        let data = varmap.data().lock().unwrap();
        data.get("value_head.weight").unwrap().as_tensor().clone()
    };
    let before = head_weight.flatten_all().unwrap().to_vec1::<f32>().unwrap();

    let out = net.act(&observation()).unwrap();
    let loss = out.value.mean_all().unwrap().neg().unwrap();
    let grads = loss.backward().unwrap();

    let head_grad = grads.get(&head_weight).expect("value head has a gradient");
    assert!(head_grad
        .flatten_all()
        .unwrap()
        .to_vec1::<f32>()
        .unwrap()
        .iter()
        .all(|g| g.is_finite()));
    for var in varmap.all_vars() {
        if let Some(g) = grads.get(var.as_tensor()) {
            let values = g.flatten_all().unwrap().to_vec1::<f32>().unwrap();
            assert!(values.iter().all(|v| v.is_finite()));
        }
    }

    opt.step(&grads).unwrap();
    let after = head_weight.flatten_all().unwrap().to_vec1::<f32>().unwrap();
    assert_ne!(before, after);
}
